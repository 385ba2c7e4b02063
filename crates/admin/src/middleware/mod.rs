//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions)
//!
//! Authentication is enforced per handler by the extractors in [`auth`].

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, RequireSuperAdmin, clear_current_admin, set_current_admin};
pub use security_headers::security_headers;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_session_store, session_key};
