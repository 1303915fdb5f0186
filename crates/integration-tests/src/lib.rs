//! Integration tests for SwiftBite.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the API
//! cargo run -p swiftbite-cli -- migrate
//! cargo run -p swiftbite-api
//!
//! # Run the ignored end-to-end tests against it
//! SWIFTBITE_ADMIN_TOKEN=... cargo test -p swiftbite-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SWIFTBITE_API_URL` - API base URL (default `http://127.0.0.1:3000`)
//! - `SWIFTBITE_ADMIN_TOKEN` - Admin bearer token, needed to create drivers
//!   and move orders through the board
//!
//! Every helper creates its own customers, drivers and orders with random
//! phones, so tests can run concurrently against one shared database.

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("SWIFTBITE_API_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

/// Admin bearer token from the environment.
#[must_use]
pub fn admin_token() -> String {
    std::env::var("SWIFTBITE_ADMIN_TOKEN").expect("SWIFTBITE_ADMIN_TOKEN must be set")
}

/// A random, valid phone number so test rows never collide.
#[must_use]
pub fn unique_phone() -> String {
    format!("+2010{:08}", rand::random_range(0..100_000_000_u32))
}

/// HTTP client bound to the API base URL.
pub struct Api {
    client: Client,
    base: String,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl Api {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base: api_base_url(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// `request` with the admin token attached.
    #[must_use]
    pub fn as_admin(request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(admin_token())
    }

    /// Send `request` and return status plus JSON body (`Null` when empty).
    pub async fn send(request: RequestBuilder) -> (StatusCode, Value) {
        let response: Response = request.send().await.expect("request failed");
        let status = response.status();
        let bytes = response.bytes().await.expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is not JSON")
        };
        (status, body)
    }

    /// Place an order with items sent as an encoded string, like the web client.
    pub async fn place_order(&self, customer_name: &str, total: &str) -> Value {
        let (status, body) = Self::send(self.post("/api/orders").json(&json!({
            "customerName": customer_name,
            "customerPhone": unique_phone(),
            "deliveryAddress": "12 Nile St",
            "items": r#"[{"name":"Kofta Plate","price":"20.00","quantity":2}]"#,
            "totalAmount": total,
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED, "place order: {body}");
        body
    }

    /// Move an order to `status` as admin.
    pub async fn set_status(&self, order_id: i64, status: &str) -> (StatusCode, Value) {
        Self::send(Self::as_admin(
            self.put(&format!("/api/orders/{order_id}"))
                .json(&json!({ "status": status })),
        ))
        .await
    }

    /// Create an active driver through the admin API and return its JSON.
    pub async fn create_driver(&self, name: &str) -> Value {
        let (status, body) = Self::send(Self::as_admin(self.post("/api/admin/drivers").json(
            &json!({
                "name": name,
                "phone": unique_phone(),
                "password": "delivery-pass-1",
            }),
        )))
        .await;
        assert_eq!(status, StatusCode::CREATED, "create driver: {body}");
        body
    }

    /// Toggle a driver's availability.
    pub async fn set_available(&self, driver_id: i64, available: bool) -> Value {
        let (status, body) = Self::send(
            self.put(&format!("/api/drivers/{driver_id}"))
                .json(&json!({ "isAvailable": available })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "set availability: {body}");
        body
    }
}

/// Numeric `id` field of a JSON object.
#[must_use]
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("missing numeric id")
}
