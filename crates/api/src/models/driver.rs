//! Driver domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use swiftbite_core::{DriverId, Money, Phone};

/// A delivery driver. The password hash never leaves the repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub phone: Phone,
    pub email: Option<String>,
    pub vehicle_type: String,
    /// Set by the driver; gates the available-orders queue.
    pub is_available: bool,
    /// Set by an admin; inactive drivers cannot log in or claim orders.
    pub is_active: bool,
    pub current_location: Option<String>,
    /// Sum of delivery fees for delivered orders.
    pub total_earnings: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Whether this driver may be offered unassigned orders.
    #[must_use]
    pub const fn can_take_orders(&self) -> bool {
        self.is_active && self.is_available
    }

    /// The part of the profile shown to customers tracking an order.
    #[must_use]
    pub fn summary(&self) -> DriverSummary {
        DriverSummary {
            id: self.id,
            name: self.name.clone(),
            phone: self.phone.clone(),
            vehicle_type: self.vehicle_type.clone(),
            current_location: self.current_location.clone(),
        }
    }
}

/// Public driver details attached to a tracked order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub id: DriverId,
    pub name: String,
    pub phone: Phone,
    pub vehicle_type: String,
    pub current_location: Option<String>,
}
