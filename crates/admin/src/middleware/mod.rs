//! HTTP middleware for the admin API.
//!
//! # Layer order (outermost first, as assembled in `routes::app`)
//!
//! 1. Sentry (`sentry_tower`)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Auth extractors per handler, rate limiting on `/api/admin/auth`

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireSuperAdmin, RequireWriteAccess,
    clear_current_admin, set_current_admin,
};
pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
