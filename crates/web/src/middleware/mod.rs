//! HTTP middleware for the web app.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions over a `moka` cache with idle eviction)

pub mod auth;
pub mod session;

pub use auth::{OptionalSignIn, RequireSignIn, save_form, sign_in, sign_out};
pub use session::{MokaSessionStore, create_session_layer};
