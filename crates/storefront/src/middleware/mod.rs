//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first, as built in `routes::app`)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and sniffing protection)
//! 5. Panic recovery (generic 500 body)
//!
//! Rate limiting (governor) is a route layer on `/api/newsletter` only, so it
//! runs inside all of the above.

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::newsletter_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
