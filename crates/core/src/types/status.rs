//! Order lifecycle and related enums.
//!
//! The lifecycle is a short forward chain with one side exit:
//!
//! ```text
//! pending -> confirmed -> preparing -> on_way -> delivered
//!    |
//!    +-> cancelled
//! ```
//!
//! Every mutation path (admin board, driver app, customer cancel) goes
//! through [`OrderStatus::transition`], so an illegal jump is rejected in one
//! place instead of per screen.

use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, not yet accepted by the restaurant.
    #[default]
    Pending,
    /// Accepted by the restaurant; visible to available drivers.
    Confirmed,
    /// Being cooked.
    Preparing,
    /// Picked up and travelling to the customer.
    OnWay,
    /// Handed to the customer.
    Delivered,
    /// Withdrawn before the restaurant confirmed it.
    Cancelled,
}

/// A requested status change that the lifecycle does not allow.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct TransitionError {
    /// Status the order is currently in.
    pub from: OrderStatus,
    /// Status that was requested.
    pub to: OrderStatus,
}

/// Error returned when parsing an unknown status string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::OnWay,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Parse the wire spelling. Matching is exact, so `"Pending"` or
    /// `"on-way"` are unknown.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStatus` for anything outside [`OrderStatus::ALL`].
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }

    /// The wire/database spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OnWay => "on_way",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// The forward successor, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::OnWay),
            Self::OnWay => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether `target` is a legal next status.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        match (self, target) {
            (Self::Pending, Self::Cancelled) => true,
            (from, to) => from.next() == Some(to),
        }
    }

    /// Validate a transition and return the new status.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when `target` is not reachable in one step.
    pub fn transition(self, target: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(TransitionError {
                from: self,
                to: target,
            })
        }
    }

    /// Delivered and cancelled orders never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Still moving through the lifecycle.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether a driver may still be attached or reassigned.
    #[must_use]
    pub const fn accepts_driver(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Preparing | Self::OnWay)
    }

    /// Default customer-facing message recorded in the tracking log.
    #[must_use]
    pub const fn tracking_message(&self) -> &'static str {
        match self {
            Self::Pending => "Order placed",
            Self::Confirmed => "Order confirmed by the restaurant",
            Self::Preparing => "Your food is being prepared",
            Self::OnWay => "Your order is on the way",
            Self::Delivered => "Order delivered",
            Self::Cancelled => "Order cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Who caused a tracking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "actor_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Customer,
    Admin,
    Driver,
    System,
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
            Self::Driver => write!(f, "driver"),
            Self::System => write!(f, "system"),
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
    Card,
    Wallet,
}
