//! End-to-end order lifecycle against a running API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sb-cli migrate)
//! - The API server running (cargo run -p swiftbite-api)
//! - `SWIFTBITE_ADMIN_TOKEN` matching the server's token
//!
//! Run with: cargo test -p swiftbite-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use swiftbite_integration_tests::{Api, id_of};

// ============================================================================
// Placement & tracking
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_place_order_with_encoded_items() {
    let api = Api::new();
    let order = api.place_order("Ali", "50").await;

    assert_eq!(order["status"], "pending");
    let number = order["orderNumber"].as_str().expect("orderNumber");
    assert!(number.starts_with("SB-"), "{number}");
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(order["subtotal"], "40.00");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_track_shows_pending_entry() {
    let api = Api::new();
    let order = api.place_order("Ali", "50").await;
    let id = id_of(&order);

    let (status, body) = Api::send(api.get(&format!("/api/orders/{id}/track"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], id);
    let tracking = body["tracking"].as_array().expect("tracking array");
    assert!(tracking.iter().any(|e| e["status"] == "pending"));
    assert!(body["driver"].is_null());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_missing_customer_name_rejected() {
    let api = Api::new();
    let (status, body) = Api::send(api.post("/api/orders").json(&json!({
        "items": [{"name": "Tea", "price": "2.00", "quantity": 1}],
        "totalAmount": "2.00",
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_order_is_404() {
    let api = Api::new();
    let (status, _) = Api::send(api.get("/api/orders/2147483647")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Transitions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_forward_transitions_change_only_status() {
    let api = Api::new();
    let order = api.place_order("Mona", "75").await;
    let id = id_of(&order);

    let mut previous = order;
    for next in ["confirmed", "preparing", "on_way", "delivered"] {
        let (status, updated) = api.set_status(id, next).await;
        assert_eq!(status, StatusCode::OK, "{next}: {updated}");
        assert_eq!(updated["status"], next);

        for field in ["orderNumber", "customerName", "items", "totalAmount", "deliveryFee"] {
            assert_eq!(updated[field], previous[field], "{field} changed on {next}");
        }
        previous = updated;
    }

    let (_, body) = Api::send(api.get(&format!("/api/orders/{id}/track"))).await;
    let statuses: Vec<_> = body["tracking"]
        .as_array()
        .expect("tracking array")
        .iter()
        .map(|e| e["status"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        statuses,
        ["pending", "confirmed", "preparing", "on_way", "delivered"]
    );
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_skipping_a_step_is_conflict() {
    let api = Api::new();
    let id = id_of(&api.place_order("Sara", "20").await);

    let (status, body) = api.set_status(id, "delivered").await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, order) = Api::send(api.get(&format!("/api/orders/{id}"))).await;
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cancel_pending_order() {
    let api = Api::new();
    let id = id_of(&api.place_order("Omar", "30").await);

    let (status, body) = Api::send(
        api.post(&format!("/api/orders/{id}/cancel"))
            .json(&json!({"reason": "ordered twice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cancel_after_confirmation_is_conflict() {
    let api = Api::new();
    let id = id_of(&api.place_order("Omar", "30").await);
    let (status, _) = api.set_status(id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = Api::send(api.post(&format!("/api/orders/{id}/cancel"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_review_only_after_delivery() {
    let api = Api::new();
    let id = id_of(&api.place_order("Huda", "40").await);
    let review = json!({"rating": 5, "comment": "Still hot"});

    let (status, _) = Api::send(
        api.post(&format!("/api/customers/orders/{id}/review"))
            .json(&review),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["confirmed", "preparing", "on_way", "delivered"] {
        api.set_status(id, next).await;
    }

    let (status, body) = Api::send(
        api.post(&format!("/api/customers/orders/{id}/review"))
            .json(&review),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["rating"], 5);

    let (status, _) = Api::send(
        api.post(&format!("/api/customers/orders/{id}/review"))
            .json(&review),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
