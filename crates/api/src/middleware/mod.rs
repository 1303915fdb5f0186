//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS
//!
//! Admin routes additionally extract [`RequireAdmin`].

pub mod admin;
pub mod request_id;

pub use admin::{OptionalAdmin, RequireAdmin};
pub use request_id::request_id_middleware;
