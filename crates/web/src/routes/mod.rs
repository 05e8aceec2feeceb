//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Sign-in prompt or profile form and list
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /auth/login             - Redirect to Google
//! GET  /auth/callback          - Handle OAuth callback
//! POST /auth/logout            - Sign out
//!
//! # Profiles (requires sign-in)
//! POST /profiles               - Submit the draft (create or update)
//! POST /profiles/refresh       - Re-fetch the list
//! POST /profiles/cancel        - Leave edit mode
//! POST /profiles/{id}/edit     - Load a record into the form
//! POST /profiles/{id}/delete   - Delete a record
//!
//! # API
//! POST /api/submit             - Privileged name + age insert
//! ```

pub mod api;
pub mod auth;
pub mod home;
pub mod profiles;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the profile form routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(profiles::submit))
        .route("/refresh", post(profiles::refresh))
        .route("/cancel", post(profiles::cancel))
        .route("/{id}/edit", post(profiles::edit))
        .route("/{id}/delete", post(profiles::delete))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .nest("/auth", auth_routes())
        .nest("/profiles", profile_routes())
        .route("/api/submit", post(api::submit::submit))
}
