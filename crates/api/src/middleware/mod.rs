//! HTTP middleware stack for the customer API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layer (hub per request, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Error boundary (render the JSON error envelope once)
//! 5. Catch panic (turn panics into classified internal errors)

pub mod error_boundary;
pub mod request_id;

pub use error_boundary::{error_boundary, handle_panic, render_error_envelope};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
