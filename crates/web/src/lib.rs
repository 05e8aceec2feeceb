//! Profile Hub web application.
//!
//! Google sign-in through Firebase Authentication, a profile form backed by
//! Cloud Firestore, and a privileged JSON submit endpoint. Built as a library
//! so the router can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod controller;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the application router with the session layer applied.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
