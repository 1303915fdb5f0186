//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use swiftbite_core::{AddressId, CustomerId, Phone};

/// A customer, identified by phone number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Phone,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry in a customer's address book.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddress {
    pub id: AddressId,
    pub customer_id: CustomerId,
    /// Short name such as "Home" or "Work".
    pub label: String,
    pub address: String,
    pub notes: Option<String>,
    /// Pre-filled at checkout. At most one per customer.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
