//! Bearer token extractors.
//!
//! Handlers declare the access they need by taking one of these extractors:
//!
//! ```rust,ignore
//! async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse { ... }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extract the raw token from `Authorization: Bearer <token>`.
///
/// Returns `Ok(None)` when the header is absent and an error when it is
/// present but not a bearer credential.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Malformed authorization header".to_owned()))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(AppError::Unauthorized(
            "Authorization header must be a bearer token".to_owned(),
        )),
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };

    let user = state
        .tokens()
        .verify(token)
        .map_err(|e| AppError::Auth(AuthError::InvalidToken(e)))?;

    tracing::Span::current().record("user_id", user.id.as_i32());
    crate::error::set_sentry_user(&user.id);

    Ok(Some(user))
}

/// Extractor that requires a valid session token.
///
/// Rejects with 401 when the token is missing, malformed or expired.
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_owned()))
    }
}

/// Extractor that requires a valid session token for an admin.
///
/// Rejects with 401 like [`RequireUser`], and with 403 for non-admin users.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// A missing header yields `None`. A token that is present but invalid is
/// still rejected so clients notice expired sessions.
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}
