//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! pn-cli admin create -e admin@example.com -n "Admin Name" -p "a-long-password"
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use paradise_api::db::{RepositoryError, UserRepository};
use paradise_api::services::auth::{AuthError, MIN_PASSWORD_LENGTH, hash_password};
use paradise_core::{Email, EmailError, Role, UserId};
use sqlx::PgPool;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Name is blank.
    #[error("Name is required")]
    MissingName,

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError` if the input is invalid, the email is taken or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<UserId, AdminError> {
    let pool = connect().await?;
    let id = insert_admin(&pool, email, name, password).await?;

    tracing::info!("Admin user created successfully! ID: {}, Email: {}", id, email);
    Ok(id)
}

/// Validate and insert an admin account on an existing pool.
///
/// # Errors
///
/// Same as [`create_user`], minus connection failures.
pub(super) async fn insert_admin(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: &str,
) -> Result<UserId, AdminError> {
    let (email, name) = validate(email, name, password)?;
    let users = UserRepository::new(pool);

    if users.get_by_email(&email).await?.is_some() {
        return Err(AdminError::UserExists(email.into_inner()));
    }

    tracing::info!("Creating admin user: {}", email);
    let hash = hash_password(password)?;
    let user = users
        .create(name, &email, &hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.as_str().to_owned()),
            other => other.into(),
        })?;

    Ok(user.id)
}

fn validate<'a>(
    email: &str,
    name: &'a str,
    password: &str,
) -> Result<(Email, &'a str), AdminError> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::MissingName);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }
    Ok((email, name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_admin() {
        let (email, name) = validate("Admin@Paradise.com", "  Admin User ", "admin1234").unwrap();
        assert_eq!(email.as_str(), "admin@paradise.com");
        assert_eq!(name, "Admin User");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            validate("not-an-email", "Admin", "admin1234"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate("a@b.com", "   ", "admin1234"),
            Err(AdminError::MissingName)
        ));
        assert!(matches!(
            validate("a@b.com", "Admin", "short"),
            Err(AdminError::WeakPassword)
        ));
    }
}
