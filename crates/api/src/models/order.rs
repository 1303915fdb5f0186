//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use swiftbite_core::{
    ActorType, CustomerId, DriverId, LineItems, Money, OrderId, OrderNumber, OrderStatus,
    PaymentMethod, RestaurantId, TrackingEventId,
};

use super::driver::DriverSummary;

/// An order with its customer snapshot and item list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_id: Option<CustomerId>,
    pub restaurant_id: Option<RestaurantId>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub items: LineItems,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub driver_id: Option<DriverId>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of an order's status history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub id: TrackingEventId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub message: String,
    pub actor_type: ActorType,
    pub created_at: DateTime<Utc>,
}

/// Response body of the tracking endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub order: Order,
    /// Oldest first.
    pub tracking: Vec<TrackingEvent>,
    pub driver: Option<DriverSummary>,
}
