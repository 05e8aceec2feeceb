//! Google sign-in route handlers.
//!
//! - Login: stores state and nonce in the session and redirects to Google
//! - Callback: checks state, completes sign-in and enters the signed-in state
//! - Logout: leaves the signed-in state
//!
//! Every failure is logged and redirects back to `/` with nothing shown to
//! the user; the session stays signed out.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use tower_sessions::Session;

use crate::controller::SignedInForm;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{sign_in, sign_out};
use crate::models::session_keys;
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed or was cancelled.
    pub error: Option<String>,
}

/// Random alphanumeric string for OAuth state and nonce values.
fn random_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn signed_out() -> Response {
    Redirect::to("/").into_response()
}

/// Start Google sign-in.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = random_token(32);
    let nonce = random_token(32);

    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return signed_out();
    }
    if let Err(e) = session.insert(session_keys::OAUTH_NONCE, &nonce).await {
        tracing::error!("Failed to store OAuth nonce in session: {}", e);
        return signed_out();
    }

    let auth_url =
        state
            .identity()
            .authorization_url(&state.config().redirect_uri(), &oauth_state, &nonce);

    Redirect::to(&auth_url).into_response()
}

/// Complete Google sign-in.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Google sign-in cancelled or denied");
        return signed_out();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return signed_out();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let stored_nonce: Option<String> = session
        .remove(session_keys::OAUTH_NONCE)
        .await
        .ok()
        .flatten();

    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("OAuth state mismatch");
        return signed_out();
    }
    let Some(nonce) = stored_nonce else {
        tracing::warn!("OAuth nonce missing from session");
        return signed_out();
    };

    let authenticated = match state
        .identity()
        .exchange_code(&code, &state.config().redirect_uri(), &nonce)
        .await
    {
        Ok(authenticated) => authenticated,
        Err(e) => {
            tracing::error!("Failed to complete Google sign-in: {}", e);
            return signed_out();
        }
    };

    set_sentry_user(
        &authenticated.principal.email,
        authenticated.principal.display_name.as_deref(),
    );

    let form = SignedInForm::enter(state.records(), authenticated).await;
    if let Err(e) = sign_in(&session, &form).await {
        tracing::error!("Failed to store signed-in state: {}", e);
        return signed_out();
    }

    tracing::info!(email = %form.principal.email, "user signed in");
    Redirect::to("/").into_response()
}

/// Sign out. Signing out twice is harmless.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Result<Redirect> {
    sign_out(&session).await?;
    clear_sentry_user();
    tracing::info!("user signed out");
    Ok(Redirect::to("/"))
}
