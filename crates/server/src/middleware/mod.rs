//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Set request ID (`x-request-id`, kept from the caller or a new UUID)
//! 3. `TraceLayer` (request span carrying the request ID)
//! 4. Propagate request ID (echo it on the response)
//! 5. Security headers (CSP, frame, referrer)

pub mod security_headers;

pub use security_headers::security_headers_middleware;
