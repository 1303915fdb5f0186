//! Review domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use swiftbite_core::{CustomerId, OrderId, RestaurantId, ReviewId};

/// A customer's rating of a delivered order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub order_id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub restaurant_id: Option<RestaurantId>,
    /// 1 to 5.
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
