//! Database diagnostics.
//!
//! ```bash
//! pn-cli db check
//! ```

use paradise_api::db::{RepositoryError, UserRepository};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors from the connectivity check.
#[derive(Debug, Error)]
pub enum DbCheckError {
    #[error("DB_CONNECTION_FAILED: {0}")]
    Connect(#[from] ConnectError),

    #[error("DB_CONNECTION_FAILED: {0}")]
    Query(#[from] RepositoryError),
}

/// Connect and report how many users are registered.
///
/// # Errors
///
/// Returns `DbCheckError` if the database cannot be reached or queried.
pub async fn check() -> Result<(), DbCheckError> {
    tracing::info!("Attempting database connection...");
    let pool = connect().await?;
    tracing::info!("DB_CONNECTED_SUCCESSFULLY");

    let count = UserRepository::new(&pool).count().await?;
    tracing::info!(users = count, "User count: {count}");

    pool.close().await;
    Ok(())
}
