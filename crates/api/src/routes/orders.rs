//! Order routes.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;

use swiftbite_core::{ActorType, DriverId, OrderId, OrderStatus};

use crate::error::{ApiJson, ApiPath, AppError, Result};
use crate::middleware::admin::OptionalAdmin;
use crate::models::{Order, OrderTracking};
use crate::services::orders::{CreateOrderRequest, StatusChange, prepare_order};
use crate::services::{OrderService, ResolvedSettings};
use crate::state::AppState;

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub driver_id: Option<DriverId>,
    pub message: Option<String>,
    /// Who is making the change. Admin requires the admin token.
    pub actor_type: Option<ActorType>,
}

/// Body of `POST /api/orders/{id}/cancel`. May be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// Work out who is changing an order.
///
/// A valid admin token always wins. Without one, the body may name a
/// customer or driver but never an admin.
fn resolve_actor(is_admin: bool, claimed: Option<ActorType>) -> Result<ActorType> {
    if is_admin {
        return Ok(ActorType::Admin);
    }
    match claimed {
        Some(ActorType::Admin) => Err(AppError::Unauthorized(
            "Admin changes require the admin token".to_string(),
        )),
        Some(actor) => Ok(actor),
        None => Ok(ActorType::System),
    }
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    ResolvedSettings(settings): ResolvedSettings,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let new_order = prepare_order(request, &settings)?;
    let order = OrderService::new(state.pool()).place(&new_order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(OrderService::new(state.pool()).get(id).await?))
}

/// `GET /api/orders/{id}/track`
pub async fn track(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderTracking>> {
    Ok(Json(OrderService::new(state.pool()).track(id).await?))
}

/// `PUT /api/orders/{id}`
pub async fn update_status(
    State(state): State<AppState>,
    OptionalAdmin(is_admin): OptionalAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let actor = resolve_actor(is_admin, request.actor_type)?;
    let order = OrderService::new(state.pool())
        .change_status(
            id,
            StatusChange {
                status: request.status,
                driver_id: request.driver_id,
                actor,
                message: request.message,
            },
        )
        .await?;
    Ok(Json(order))
}

/// `POST /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    OptionalAdmin(is_admin): OptionalAdmin,
    ApiPath(id): ApiPath<OrderId>,
    body: Bytes,
) -> Result<Json<Order>> {
    let request: CancelRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CancelRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let actor = if is_admin {
        ActorType::Admin
    } else {
        ActorType::Customer
    };
    let order = OrderService::new(state.pool())
        .cancel(id, actor, request.reason)
        .await?;
    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::test_support::{app, json_body, json_request};

    #[test]
    fn admin_token_sets_actor() {
        assert_eq!(resolve_actor(true, None).unwrap(), ActorType::Admin);
        assert_eq!(
            resolve_actor(true, Some(ActorType::Driver)).unwrap(),
            ActorType::Admin
        );
    }

    #[test]
    fn body_cannot_claim_admin() {
        assert!(matches!(
            resolve_actor(false, Some(ActorType::Admin)),
            Err(AppError::Unauthorized(_))
        ));
        assert_eq!(
            resolve_actor(false, Some(ActorType::Driver)).unwrap(),
            ActorType::Driver
        );
        assert_eq!(resolve_actor(false, None).unwrap(), ActorType::System);
    }

    #[test]
    fn unknown_status_fails_to_decode() {
        let result: std::result::Result<UpdateStatusRequest, _> =
            serde_json::from_str(r#"{"status": "shipped"}"#);
        assert!(result.is_err());

        let ok: UpdateStatusRequest =
            serde_json::from_str(r#"{"status": "on_way", "driverId": 4}"#).unwrap();
        assert_eq!(ok.status, OrderStatus::OnWay);
        assert_eq!(ok.driver_id, Some(DriverId::new(4)));
    }

    #[tokio::test]
    async fn claiming_admin_without_token_is_unauthorized() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/orders/1",
                r#"{"status": "confirmed", "actorType": "admin"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("admin token"));
    }

    #[tokio::test]
    async fn invalid_status_body_is_bad_request() {
        let response = app()
            .oneshot(json_request("PUT", "/api/orders/1", r#"{"status": "teleported"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
