//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness
//! GET  /health/ready                             - Readiness (database ping)
//!
//! # Catalog (public)
//! GET  /api/categories                           - Active categories
//! GET  /api/restaurants                          - Restaurants (?categoryId&search&openOnly)
//! GET  /api/restaurants/{id}                     - Restaurant detail
//! GET  /api/restaurants/{id}/menu                - Available menu grouped by section
//! GET  /api/restaurants/{id}/reviews             - Recent reviews
//! GET  /api/offers                               - Current special offers
//! GET  /api/settings                             - Typed UI settings
//!
//! # Orders (public)
//! POST /api/orders                               - Place an order
//! GET  /api/orders/{id}                          - Order
//! GET  /api/orders/{id}/track                    - Order + tracking + driver
//! PUT  /api/orders/{id}                          - Status change / driver assignment
//! POST /api/orders/{id}/cancel                   - Cancel a pending order
//!
//! # Customers
//! POST /api/customers                            - Find or create by phone
//! GET  /api/customers/by-phone/{phone}           - Lookup by phone
//! GET  /api/customers/{id}                       - Customer
//! PUT  /api/customers/{id}                       - Update name/email
//! GET  /api/customers/{id}/orders                - Order history
//! GET  /api/customers/{id}/addresses             - Address book
//! POST /api/customers/{id}/addresses             - Add address
//! PUT  /api/customers/{id}/addresses/{aid}       - Update address
//! DELETE /api/customers/{id}/addresses/{aid}     - Delete address
//! PUT  /api/customers/{id}/addresses/{aid}/default - Make default
//! POST /api/customers/orders/{orderId}/review    - Review a delivered order
//!
//! # Drivers
//! POST /api/drivers/login                        - Phone + password
//! GET  /api/drivers/{id}                         - Driver profile
//! PUT  /api/drivers/{id}                         - Availability / location
//! GET  /api/drivers/{id}/available-orders        - Claimable orders
//! GET  /api/drivers/{id}/orders                  - Active assigned orders
//! GET  /api/drivers/{id}/history                 - Delivered orders
//! POST /api/drivers/{id}/orders/{orderId}/accept - Claim an order
//!
//! # Admin (Authorization: Bearer <token>)
//! see `admin::routes`
//! ```

pub mod admin;
pub mod catalog;
pub mod customers;
pub mod drivers;
pub mod health;
pub mod orders;

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Public, customer and driver API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/categories", get(catalog::list_categories))
        .route("/restaurants", get(catalog::list_restaurants))
        .route("/restaurants/{id}", get(catalog::show_restaurant))
        .route("/restaurants/{id}/menu", get(catalog::restaurant_menu))
        .route("/restaurants/{id}/reviews", get(catalog::restaurant_reviews))
        .route("/offers", get(catalog::list_offers))
        .route("/settings", get(catalog::ui_settings))
        // Orders
        .route("/orders", post(orders::create))
        .route("/orders/{id}", get(orders::show).put(orders::update_status))
        .route("/orders/{id}/track", get(orders::track))
        .route("/orders/{id}/cancel", post(orders::cancel))
        // Customers
        .route("/customers", post(customers::find_or_create))
        .route("/customers/by-phone/{phone}", get(customers::by_phone))
        .route("/customers/{id}", get(customers::show).put(customers::update))
        .route("/customers/{id}/orders", get(customers::orders))
        .route(
            "/customers/{id}/addresses",
            get(customers::list_addresses).post(customers::create_address),
        )
        .route(
            "/customers/{id}/addresses/{address_id}",
            put(customers::update_address).delete(customers::delete_address),
        )
        .route(
            "/customers/{id}/addresses/{address_id}/default",
            put(customers::set_default_address),
        )
        .route("/customers/orders/{order_id}/review", post(customers::review_order))
        // Drivers
        .route("/drivers/login", post(drivers::login))
        .route("/drivers/{id}", get(drivers::show).put(drivers::update))
        .route("/drivers/{id}/available-orders", get(drivers::available_orders))
        .route("/drivers/{id}/orders", get(drivers::active_orders))
        .route("/drivers/{id}/history", get(drivers::history))
        .route("/drivers/{id}/orders/{order_id}/accept", post(drivers::accept))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .nest("/api/admin", admin::routes())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Router fixtures backed by a pool that never connects.

    use std::net::{IpAddr, Ipv4Addr};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, Response};
    use sqlx::postgres::PgPoolOptions;

    use super::router;
    use crate::config::{ApiConfig, LogFormat};
    use crate::state::AppState;

    pub const ADMIN_TOKEN: &str = "k3T9vQ2mZx8LwR4pN7sY1bHc6FjD0gAe";

    pub fn app() -> axum::Router {
        let config = ApiConfig {
            database_url: "postgres://swiftbite@127.0.0.1:1/unreachable".into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            admin_token: ADMIN_TOKEN.into(),
            cors_origins: Vec::new(),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://swiftbite@127.0.0.1:1/unreachable")
            .unwrap();
        router(AppState::new(config, pool))
    }

    pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::test_support::{app, get, json_body};

    #[tokio::test]
    async fn liveness_needs_no_database() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn readiness_reports_unreachable_database() {
        let response = app().oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn non_numeric_ids_are_bad_requests() {
        for uri in ["/api/orders/abc", "/api/restaurants/x/menu", "/api/drivers/me"] {
            let response = app().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = json_body(response).await;
            assert!(body["error"].is_string());
        }
    }
}
