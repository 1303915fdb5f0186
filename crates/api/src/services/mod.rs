//! Business logic on top of the repositories.
//!
//! Services own every multi-statement mutation: they open the transaction,
//! lock what needs locking, validate against the current row and commit.
//! Handlers only parse input and shape output.

pub mod auth;
pub mod orders;
pub mod reviews;
pub mod settings;

use swiftbite_core::TransitionError;
use thiserror::Error;

use crate::db::RepositoryError;

pub use auth::DriverAuthService;
pub use orders::OrderService;
pub use reviews::ReviewService;
pub use settings::{ResolvedSettings, SettingsCache};

/// Errors returned by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity doesn't exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request conflicts with the current state.
    #[error("{0}")]
    Conflict(String),

    /// Status change not allowed from the current status.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The platform is not accepting this kind of request right now.
    #[error("{0}")]
    Unavailable(String),

    /// Phone or password is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is inactive")]
    Inactive,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(err.into())
    }
}
