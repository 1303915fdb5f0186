//! SwiftBite Core - Shared domain types.
//!
//! This crate provides the types used across all SwiftBite components:
//! - `api` - REST API for customers, drivers and admin staff
//! - `cli` - Migrations, seeding, driver management and polling watch views
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no database access,
//! no HTTP clients. The order lifecycle lives here as a closed enum with an
//! explicit transition table so every surface enforces the same rules.
//!
//! # Modules
//!
//! - [`types`] - IDs, phone numbers, money, order status, line items, UI settings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
