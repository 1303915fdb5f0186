//! Driver account commands.
//!
//! # Usage
//!
//! ```bash
//! sb-cli driver create -n "Omar Adel" -p "+201001234567" --password "s3cret-pass" -v scooter
//! ```

use swiftbite_api::db;
use swiftbite_api::services::DriverAuthService;
use swiftbite_api::services::auth::DriverRegistration;

use super::database_url;

/// Create a driver with an argon2-hashed password.
///
/// # Errors
///
/// Returns an error for invalid input, a phone that is already registered,
/// or a database failure.
pub async fn create(
    name: String,
    phone: String,
    password: String,
    email: Option<String>,
    vehicle_type: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let driver = DriverAuthService::new(&pool)
        .register(&DriverRegistration {
            name,
            phone,
            email,
            password,
            vehicle_type,
        })
        .await?;

    tracing::info!(
        "Driver created successfully! ID: {}, Phone: {}, Vehicle: {}",
        driver.id,
        driver.phone,
        driver.vehicle_type
    );
    tracing::warn!("Note: New drivers start unavailable until they toggle availability.");

    Ok(())
}
