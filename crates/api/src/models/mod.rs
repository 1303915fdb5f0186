//! Domain models returned by repositories and serialized by handlers.
//!
//! JSON field names are camelCase to match what the web and mobile clients
//! already send and expect.

pub mod catalog;
pub mod customer;
pub mod driver;
pub mod order;
pub mod review;

pub use catalog::{Category, MenuItem, MenuSection, Restaurant, SpecialOffer};
pub use customer::{Customer, CustomerAddress};
pub use driver::{Driver, DriverSummary};
pub use order::{Order, OrderTracking, TrackingEvent};
pub use review::Review;
