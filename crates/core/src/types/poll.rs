//! Refresh cadence for polling clients.
//!
//! There is no push channel. Each client view re-issues the same read on a
//! fixed timer and replaces its state with whatever comes back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A polling view and its refresh interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollTarget {
    /// Unassigned orders shown to an available driver.
    DriverQueue,
    /// Admin order board and stats.
    AdminDashboard,
    /// A single order's tracking page.
    OrderTracking,
    /// Customer profile and order history.
    CustomerProfile,
}

impl PollTarget {
    /// How often the view refreshes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        match self {
            Self::DriverQueue => Duration::from_secs(3),
            Self::AdminDashboard => Duration::from_secs(5),
            Self::OrderTracking => Duration::from_secs(10),
            Self::CustomerProfile => Duration::from_secs(30),
        }
    }
}
