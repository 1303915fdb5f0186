//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SWIFTBITE_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)
//!
//! Migration files live in `crates/api/migrations/` and are embedded in the
//! API library, so the CLI always applies the set the server was built with.

use swiftbite_api::db;

use super::database_url;

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
