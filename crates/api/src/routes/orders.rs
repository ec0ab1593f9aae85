//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use paradise_core::{OrderId, OrderStatus, PaymentMode, UserId};

use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireAdmin, RequireUser};
use crate::models::{NewOrder, Order, OrderLine, ShippingDetails};
use crate::state::AppState;

/// Checkout request body.
///
/// Any `userId` in the body is ignored; ownership comes from the token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Check shipping details and build a placeable order.
pub(crate) fn build_order(
    user_id: Option<UserId>,
    shipping: ShippingDetails,
    payment_mode: Option<PaymentMode>,
    lines: Vec<OrderLine>,
) -> Result<NewOrder> {
    if let Some(field) = shipping.first_missing() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    if lines.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one item".to_owned(),
        ));
    }
    if lines.iter().any(|l| l.qty == 0) {
        return Err(AppError::BadRequest(
            "Item quantity must be at least 1".to_owned(),
        ));
    }

    Ok(NewOrder {
        user_id,
        shipping,
        payment_mode: payment_mode.unwrap_or_default(),
        lines,
    })
}

/// Place an order. Guests may check out; a bearer token links the order
/// to the account.
///
/// POST /api/orders
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = build_order(
        user.map(|u| u.id),
        body.shipping,
        body.payment_mode,
        body.items,
    )?;

    let order = OrderRepository::new(state.pool()).place(&order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// All orders, newest first.
///
/// GET /api/orders
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// One user's orders, newest first.
///
/// GET /api/orders/user/{user_id}
#[instrument(skip(state))]
pub async fn for_user(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Order>>> {
    if !current.can_access(user_id) {
        return Err(AppError::Forbidden(
            "You can only view your own orders".to_owned(),
        ));
    }

    let orders = OrderRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(Json(orders))
}

/// A single order. Guest orders are visible to admins only.
///
/// GET /api/orders/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let allowed = order.user_id.map_or(current.role.is_admin(), |owner| {
        current.can_access(owner)
    });
    if !allowed {
        return Err(AppError::Forbidden(
            "You can only view your own orders".to_owned(),
        ));
    }

    Ok(Json(order))
}

/// Set an order's status.
///
/// PUT /api/orders/{id}/status
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, body.status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_owned()),
            other => other.into(),
        })?;

    tracing::info!(order_id = %id, status = %body.status, "Order status updated");
    Ok(Json(order))
}
