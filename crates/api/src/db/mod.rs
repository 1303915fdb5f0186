//! Database operations for the delivery `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `customers` - Customers identified by normalized phone
//! - `customer_addresses` - Address book (at most one default per customer)
//! - `categories` - Restaurant categories
//! - `restaurants` - Restaurant catalog
//! - `menu_items` - Dishes per restaurant
//! - `special_offers` - Promotional banners
//! - `drivers` - Delivery drivers (argon2 password hashes)
//! - `orders` - Orders with JSONB line items
//! - `order_tracking` - Append-only status history per order
//! - `reviews` - One review per delivered order
//! - `system_settings` - String key/value feature flags
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p swiftbite-cli -- migrate
//! ```
//!
//! Repositories hold a `&PgPool` for single-statement reads and writes.
//! Statements that must commit together take `&mut PgConnection` so callers
//! can run them inside one transaction.

pub mod addresses;
pub mod catalog;
pub mod customers;
pub mod drivers;
pub mod orders;
pub mod reviews;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use catalog::CatalogRepository;
pub use customers::CustomerRepository;
pub use drivers::DriverRepository;
pub use orders::OrderRepository;
pub use reviews::ReviewRepository;
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                Self::Conflict(
                    db_err
                        .constraint()
                        .map_or_else(|| db_err.message().to_string(), ToString::to_string),
                )
            }
            _ => Self::Database(err),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
