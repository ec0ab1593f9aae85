//! CLI subcommands.

pub mod admin;
pub mod db;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Neither `API_DATABASE_URL` nor `DATABASE_URL` is set.
#[derive(Debug, Error)]
#[error("Missing environment variable: API_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Read the database URL the same way the API server does.
fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Connect to the nursery database.
async fn connect() -> Result<PgPool, ConnectError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(paradise_api::db::create_pool(&database_url).await?)
}

/// Errors from [`connect`].
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
