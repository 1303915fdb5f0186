//! SwiftBite API library.
//!
//! The REST API for the SwiftBite food delivery marketplace as a library,
//! so the binary, the CLI and the tests share one implementation.
//!
//! # Surfaces
//!
//! - Customers: catalog browsing, ordering, tracking, address book, reviews
//! - Drivers: login, availability, order queue and claims
//! - Admin: dashboard, catalog and driver management, settings (bearer token)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
