//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (mirror request origin, allow credentials)
//! 5. Security headers
//! 6. Session lock (serializes state-changing requests per session cookie)
//! 7. Session layer (tower-sessions with `PostgreSQL` store, signed cookie)
//! 8. Rate limiting on login/register (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, end_session, set_current_user};
pub use rate_limit::{auth_rate_limiter, json_rate_limit_response};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use session_lock::session_lock_middleware;
