//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;
use storekeep_api::config::{ConfigError, get_database_url};

/// Environment variable holding the connection string.
pub const DATABASE_URL_VAR: &str = "STOREKEEP_DATABASE_URL";

/// Errors shared by every command that talks to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load `.env` and open a pool against the configured database.
///
/// # Errors
///
/// Returns an error if no database URL is set or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();
    let database_url = get_database_url(DATABASE_URL_VAR)?;
    tracing::info!("Connecting to database...");
    Ok(storekeep_api::db::create_pool(&database_url).await?)
}
