//! Driver app routes.

use axum::{Json, extract::State};
use serde::Deserialize;

use swiftbite_core::{DriverId, OrderId};

use crate::db::{DriverRepository, OrderRepository, RepositoryError};
use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::models::{Driver, Order};
use crate::services::{DriverAuthService, OrderService};
use crate::state::AppState;

/// Body of `POST /api/drivers/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Body of `PUT /api/drivers/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatusUpdate {
    pub is_available: Option<bool>,
    pub current_location: Option<String>,
}

fn driver_not_found() -> AppError {
    AppError::NotFound("Driver not found".to_string())
}

fn status_update_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => driver_not_found(),
        RepositoryError::Conflict(_) => {
            AppError::Conflict("Inactive drivers cannot go available".to_string())
        }
        other => other.into(),
    }
}

async fn load_driver(state: &AppState, id: DriverId) -> Result<Driver> {
    DriverRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(driver_not_found)
}

/// `POST /api/drivers/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Driver>> {
    let driver = DriverAuthService::new(state.pool())
        .login(&request.phone, &request.password)
        .await?;
    Ok(Json(driver))
}

/// `GET /api/drivers/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Driver>> {
    Ok(Json(load_driver(&state, id).await?))
}

/// `PUT /api/drivers/{id}`
///
/// Toggles availability and/or updates the reported location.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
    ApiJson(update): ApiJson<DriverStatusUpdate>,
) -> Result<Json<Driver>> {
    let location = update
        .current_location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let driver = DriverRepository::new(state.pool())
        .update_status(id, update.is_available, location)
        .await
        .map_err(status_update_error)?;

    tracing::info!(
        driver_id = %driver.id,
        is_available = driver.is_available,
        "Driver status updated"
    );
    Ok(Json(driver))
}

/// `GET /api/drivers/{id}/available-orders`
pub async fn available_orders(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool())
        .available_for_driver(id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/drivers/{id}/orders`
pub async fn active_orders(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Vec<Order>>> {
    load_driver(&state, id).await?;
    let orders = OrderRepository::new(state.pool())
        .list_active_for_driver(id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/drivers/{id}/history`
pub async fn history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Vec<Order>>> {
    load_driver(&state, id).await?;
    let orders = OrderRepository::new(state.pool())
        .list_delivered_for_driver(id)
        .await?;
    Ok(Json(orders))
}

/// `POST /api/drivers/{id}/orders/{order_id}/accept`
pub async fn accept(
    State(state): State<AppState>,
    ApiPath((id, order_id)): ApiPath<(DriverId, OrderId)>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.pool()).claim(order_id, id).await?;
    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{app, json_body, json_request};

    async fn error_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        (response.status(), json_body(response).await)
    }

    #[test]
    fn status_update_accepts_partial_bodies() {
        let update: DriverStatusUpdate =
            serde_json::from_str(r#"{"currentLocation": "Downtown"}"#).unwrap();
        assert!(update.is_available.is_none());
        assert_eq!(update.current_location.as_deref(), Some("Downtown"));
    }

    #[tokio::test]
    async fn status_update_errors_map_to_client_statuses() {
        let (status, body) = error_parts(status_update_error(RepositoryError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Driver not found");

        let (status, body) = error_parts(status_update_error(RepositoryError::Conflict(
            "inactive driver cannot go available".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Inactive drivers cannot go available");
    }

    #[tokio::test]
    async fn login_with_malformed_phone_is_unauthorized() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/drivers/login",
                r#"{"phone": "not a phone", "password": "whatever1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn login_requires_password_field() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/drivers/login",
                r#"{"phone": "+201001234567"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
