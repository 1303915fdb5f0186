//! End-to-end driver availability and claim tests.
//!
//! These tests require a migrated database, a running API server and
//! `SWIFTBITE_ADMIN_TOKEN`.
//!
//! Run with: cargo test -p swiftbite-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use swiftbite_integration_tests::{Api, id_of};

async fn confirmed_order(api: &Api) -> i64 {
    let id = id_of(&api.place_order("Yara", "45").await);
    let (status, body) = api.set_status(id, "confirmed").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    id
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unavailable_driver_sees_no_orders() {
    let api = Api::new();
    let driver = api.create_driver("Karim").await;
    let driver_id = id_of(&driver);
    confirmed_order(&api).await;

    api.set_available(driver_id, false).await;
    let (status, body) =
        Api::send(api.get(&format!("/api/drivers/{driver_id}/available-orders"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    api.set_available(driver_id, true).await;
    let (_, body) =
        Api::send(api.get(&format!("/api/drivers/{driver_id}/available-orders"))).await;
    assert!(!body.as_array().expect("orders").is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_claims_have_one_winner() {
    let api = Api::new();
    let first = id_of(&api.create_driver("Hassan").await);
    let second = id_of(&api.create_driver("Nour").await);
    api.set_available(first, true).await;
    api.set_available(second, true).await;
    let order_id = confirmed_order(&api).await;

    let (a, b) = tokio::join!(
        Api::send(api.post(&format!("/api/drivers/{first}/orders/{order_id}/accept"))),
        Api::send(api.post(&format!("/api/drivers/{second}/orders/{order_id}/accept"))),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let (_, order) = Api::send(api.get(&format!("/api/orders/{order_id}"))).await;
    assert_eq!(order["status"], "confirmed");
    let winner = order["driverId"].as_i64().expect("driver assigned");
    assert!(winner == first || winner == second);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_claimed_order_keeps_its_driver() {
    let api = Api::new();
    let winner = id_of(&api.create_driver("Mona").await);
    let other = id_of(&api.create_driver("Ziad").await);
    api.set_available(winner, true).await;
    let order_id = confirmed_order(&api).await;

    let (status, _) = Api::send(api.post(&format!(
        "/api/drivers/{winner}/orders/{order_id}/accept"
    )))
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = Api::send(
        api.put(&format!("/api/orders/{order_id}"))
            .json(&json!({"status": "confirmed", "driverId": other})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (_, order) = Api::send(api.get(&format!("/api/orders/{order_id}"))).await;
    assert_eq!(order["driverId"].as_i64(), Some(winner));

    let (status, order) = Api::send(Api::as_admin(
        api.put(&format!("/api/orders/{order_id}"))
            .json(&json!({"status": "confirmed", "driverId": other})),
    ))
    .await;
    assert_eq!(status, StatusCode::OK, "{order}");
    assert_eq!(order["driverId"].as_i64(), Some(other));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_delivery_credits_driver_earnings() {
    let api = Api::new();
    let driver_id = id_of(&api.create_driver("Tarek").await);
    api.set_available(driver_id, true).await;
    let order_id = confirmed_order(&api).await;

    let (status, _) = Api::send(api.post(&format!(
        "/api/drivers/{driver_id}/orders/{order_id}/accept"
    )))
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = Api::send(api.get(&format!("/api/drivers/{driver_id}/orders"))).await;
    assert_eq!(active.as_array().map(Vec::len), Some(1));

    for next in ["preparing", "on_way", "delivered"] {
        let (status, body) = api.set_status(order_id, next).await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (_, order) = Api::send(api.get(&format!("/api/orders/{order_id}"))).await;
    let (_, driver) = Api::send(api.get(&format!("/api/drivers/{driver_id}"))).await;
    assert_eq!(driver["totalEarnings"], order["deliveryFee"]);

    let (_, history) = Api::send(api.get(&format!("/api/drivers/{driver_id}/history"))).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_deactivated_driver_cannot_claim() {
    let api = Api::new();
    let driver_id = id_of(&api.create_driver("Samir").await);
    api.set_available(driver_id, true).await;
    let order_id = confirmed_order(&api).await;

    let (status, driver) = Api::send(Api::as_admin(
        api.put(&format!("/api/admin/drivers/{driver_id}/active"))
            .json(&json!({"isActive": false})),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(driver["isAvailable"], false);

    let (status, _) = Api::send(api.post(&format!(
        "/api/drivers/{driver_id}/orders/{order_id}/accept"
    )))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = Api::send(
        api.put(&format!("/api/drivers/{driver_id}"))
            .json(&json!({"isAvailable": true})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    let (_, driver) = Api::send(api.get(&format!("/api/drivers/{driver_id}"))).await;
    assert_eq!(driver["isAvailable"], false);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_driver_login_round_trip() {
    let api = Api::new();
    let driver = api.create_driver("Adel").await;

    let (status, body) = Api::send(api.post("/api/drivers/login").json(&json!({
        "phone": driver["phone"],
        "password": "delivery-pass-1",
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&body), id_of(&driver));
    assert!(body.get("passwordHash").is_none());

    let (status, _) = Api::send(api.post("/api/drivers/login").json(&json!({
        "phone": driver["phone"],
        "password": "wrong-password",
    })))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
