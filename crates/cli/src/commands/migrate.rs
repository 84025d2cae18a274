//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! registry-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `REGISTRY_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use customer_registry_api::config::{ApiConfig, ConfigError};
use customer_registry_api::db;

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No database URL was configured.
    #[error("REGISTRY_DATABASE_URL (or DATABASE_URL) is not set")]
    MissingDatabaseUrl,

    /// Connecting to the database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying a migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the customer database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if no database is configured, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let config = ApiConfig::from_env()?;
    let database_url = config
        .database_url
        .as_ref()
        .ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to customer database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!("Running customer migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Customer migrations complete!");
    Ok(())
}
