//! Account route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use paradise_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{ProfileChanges, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
///
/// Missing fields default to empty so they fail validation with a 400.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Updated account, keyed the way account clients read it.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

fn issue(state: &AppState, user: User) -> Result<AuthResponse> {
    let token = state
        .tokens()
        .issue(user.id, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(AuthResponse { token, user })
}

/// Create a shopper account.
///
/// POST /api/auth/register
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&body.name, &body.email, &body.password, Role::User)
        .await?;

    Ok((StatusCode::CREATED, Json(issue(&state, user)?)))
}

/// Exchange credentials for a session token.
///
/// POST /api/auth/login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(issue(&state, user)?))
}

/// Profile of the token holder.
///
/// GET /api/auth/me
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(user))
}

/// Update name and contact details.
///
/// PUT /api/auth/profile/{user_id}
#[instrument(skip(state, changes))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
    Path(user_id): Path<UserId>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<ProfileResponse>> {
    if !current.can_access(user_id) {
        return Err(AppError::Forbidden(
            "You can only update your own profile".to_owned(),
        ));
    }
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name cannot be empty".to_owned()));
    }

    let user = UserRepository::new(state.pool())
        .update_profile(user_id, &changes)
        .await?;
    Ok(Json(ProfileResponse { user }))
}
