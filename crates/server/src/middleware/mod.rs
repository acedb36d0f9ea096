//! HTTP middleware stack for the portal API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. CORS (only when `PORTAL_CORS_ORIGIN` is set)
//! 3. Response headers (`nosniff`, `cache-control: no-store`)
//! 4. `TraceLayer` (request span with a `request_id` field)
//! 5. Request ID (fills the span field, echoes `x-request-id`)
//! 6. Session layer (signed `portal_session` cookie)
//! 7. Rate limiting on `/api/auth` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, set_current_customer};
pub use rate_limit::{ClientIpKeyExtractor, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::with_sessions;
