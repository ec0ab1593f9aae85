//! Admin dashboard route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::dashboard;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::DashboardStats;
use crate::state::AppState;

/// Dashboard response body.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
}

/// Store-wide counters.
///
/// GET /api/admin/dashboard
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<DashboardResponse>> {
    let stats = dashboard::stats(state.pool(), state.config().low_stock_threshold).await?;
    Ok(Json(DashboardResponse { stats }))
}
