//! Bearer-token guard for admin routes.
//!
//! Admin tooling authenticates with a single shared token from
//! `SWIFTBITE_ADMIN_TOKEN`, sent as `Authorization: Bearer <token>`.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that rejects requests without the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_drivers(_admin: RequireAdmin, State(state): State<AppState>) -> Result<...> {
///     // only reached with a valid token
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthorized("Missing admin token".to_string()))?;

        if constant_time_compare(presented, state.config().admin_token.expose_secret()) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin token");
            Err(AppError::Unauthorized("Invalid admin token".to_string()))
        }
    }
}

/// Extractor reporting whether the request carries the admin token.
///
/// Never rejects. Shared endpoints use it to record who made a change.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAdmin(pub bool);

impl FromRequestParts<AppState> for OptionalAdmin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_admin = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .is_some_and(|token| {
                constant_time_compare(token, state.config().admin_token.expose_secret())
            });
        Ok(Self(is_admin))
    }
}

/// Extract the token from a `Bearer` authorization value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer  "), None);
    }

    #[test]
    fn compare_requires_exact_match() {
        assert!(constant_time_compare("token", "token"));
        assert!(!constant_time_compare("token", "tokem"));
        assert!(!constant_time_compare("token", "token2"));
        assert!(constant_time_compare("", ""));
    }
}
