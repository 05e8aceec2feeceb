//! Sign-in extractors and session transitions.
//!
//! A session is signed in exactly when it holds a [`SignedInForm`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::controller::SignedInForm;
use crate::models::session_keys;

/// Extractor that requires a signed-in session.
///
/// Signed-out requests are redirected to the home page, which shows the
/// sign-in prompt.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSignIn(form): RequireSignIn) -> impl IntoResponse {
///     format!("Welcome {}", form.greeting())
/// }
/// ```
pub struct RequireSignIn(pub SignedInForm);

/// Rejection for [`RequireSignIn`].
pub enum SignInRejection {
    /// Back to the sign-in prompt.
    RedirectToHome,
    /// The session layer is missing.
    NoSession,
}

impl IntoResponse for SignInRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToHome => Redirect::to("/").into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireSignIn
where
    S: Send + Sync,
{
    type Rejection = SignInRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SignInRejection::NoSession)?;

        let form: SignedInForm = session
            .get(session_keys::PROFILE_FORM)
            .await
            .ok()
            .flatten()
            .ok_or(SignInRejection::RedirectToHome)?;

        Ok(Self(form))
    }
}

/// Extractor that optionally gets the signed-in state.
pub struct OptionalSignIn(pub Option<SignedInForm>);

impl<S> FromRequestParts<S> for OptionalSignIn
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let form = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<SignedInForm>(session_keys::PROFILE_FORM)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(form))
    }
}

/// Enter the signed-in state.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    form: &SignedInForm,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    save_form(session, form).await
}

/// Write back the signed-in state after a form action.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_form(
    session: &Session,
    form: &SignedInForm,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::PROFILE_FORM, form).await
}

/// Leave the signed-in state. Signing out a signed-out session is a no-op.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<SignedInForm>(session_keys::PROFILE_FORM)
        .await?;
    Ok(())
}
