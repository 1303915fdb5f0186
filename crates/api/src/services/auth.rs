//! Driver authentication.
//!
//! Drivers sign in with phone and password. There is no session or token:
//! a successful login returns the driver profile and the client keeps it.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use swiftbite_core::Phone;

use super::ServiceError;
use crate::db::drivers::NewDriver;
use crate::db::{DriverRepository, RepositoryError};
use crate::models::Driver;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Vehicle recorded when none is given.
pub const DEFAULT_VEHICLE: &str = "motorcycle";

/// Fields for registering a driver.
#[derive(Debug, Clone)]
pub struct DriverRegistration {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub vehicle_type: Option<String>,
}

/// Driver authentication service.
pub struct DriverAuthService<'a> {
    drivers: DriverRepository<'a>,
}

impl<'a> DriverAuthService<'a> {
    /// Create a new driver authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            drivers: DriverRepository::new(pool),
        }
    }

    /// Create a driver account with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad phone, name or password
    /// and `ServiceError::Conflict` if the phone is already registered.
    pub async fn register(&self, registration: &DriverRegistration) -> Result<Driver, ServiceError> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".to_string()));
        }
        let phone = Phone::parse(&registration.phone)
            .map_err(|e| ServiceError::Validation(format!("phone: {e}")))?;
        validate_password(&registration.password)?;

        let password_hash = hash_password(&registration.password)?;
        let vehicle_type = registration
            .vehicle_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VEHICLE);

        let driver = self
            .drivers
            .create(&NewDriver {
                name,
                phone: &phone,
                email: registration.email.as_deref(),
                password_hash: &password_hash,
                vehicle_type,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    ServiceError::Conflict("a driver with this phone already exists".to_string())
                }
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(driver_id = %driver.id, "Driver registered");
        Ok(driver)
    }

    /// Verify phone and password.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidCredentials` for an unknown phone or a
    /// wrong password, and `ServiceError::Inactive` for a deactivated driver.
    #[instrument(skip_all)]
    pub async fn login(&self, phone: &str, password: &str) -> Result<Driver, ServiceError> {
        let phone = Phone::parse(phone).map_err(|_| ServiceError::InvalidCredentials)?;

        let (driver, hash) = self
            .drivers
            .get_credentials(&phone)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(password, &hash)?;

        if !driver.is_active {
            return Err(ServiceError::Inactive);
        }

        tracing::info!(driver_id = %driver.id, "Driver logged in");
        Ok(driver)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `ServiceError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ServiceError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ServiceError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn short_passwords_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
