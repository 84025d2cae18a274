//! Customer record storage.
//!
//! # Stores
//!
//! - [`MemoryCustomerStore`] - process-local store, used when no database URL
//!   is configured and in tests
//! - [`PgCustomerStore`] - `PostgreSQL` store backed by the `customers` table
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p customer-registry-cli -- migrate
//! ```

mod memory;
mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use customer_registry_core::{Customer, CustomerId, NewCustomer};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryCustomerStore;
pub use postgres::PgCustomerStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence port for customer records.
///
/// The store owns identifier assignment and email uniqueness. Callers never
/// set `created_at` through [`CustomerStore::replace`].
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers, ordered by name and then by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// Fetch a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Persist a new customer and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;

    /// Overwrite an existing customer, keeping its stored creation time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no record has this id.
    /// Returns `RepositoryError::Conflict` if the email belongs to another record.
    async fn replace(&self, customer: &Customer) -> Result<Customer, RepositoryError>;

    /// Remove a customer. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be written.
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Whether a customer with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store cannot be read.
    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store is unavailable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error, turning unique violations into `Conflict`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}
