//! Core types for SwiftBite.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod money;
pub mod order_number;
pub mod phone;
pub mod poll;
pub mod settings;
pub mod status;

pub use id::*;
pub use line_item::{LineItem, LineItemError, LineItems};
pub use money::{Money, MoneyError};
pub use order_number::OrderNumber;
pub use phone::{Phone, PhoneError};
pub use poll::PollTarget;
pub use settings::{UiSettings, setting_keys};
pub use status::*;
