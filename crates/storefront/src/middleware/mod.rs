//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, only in the binary)
//! 2. CORS (permissive, the UI may be served from another origin)
//! 3. `TraceLayer` (request span with method, path, status, latency)
//! 4. Request ID (add unique ID to each request and response)

pub mod request_id;
pub mod session;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_ID_HEADER, SessionHeader};
