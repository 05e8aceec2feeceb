//! Wire types for the Google OAuth and Firebase Identity Toolkit endpoints.

use profile_hub_core::Principal;
use serde::{Deserialize, Serialize};

use crate::store::StoreToken;

/// Result of a completed sign-in.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub principal: Principal,
    /// Firebase ID token used for end-user store calls.
    pub store_token: StoreToken,
}

/// Google token endpoint response.
#[derive(Debug, Deserialize)]
pub(super) struct GoogleTokenResponse {
    pub id_token: Option<String>,
}

/// Claims read from the Google ID token.
#[derive(Debug, Deserialize)]
pub(super) struct GoogleIdClaims {
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Google token endpoint error body.
#[derive(Debug, Deserialize)]
pub(super) struct GoogleErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Request body for `accounts:signInWithIdp`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInWithIdpRequest<'a> {
    pub post_body: String,
    pub request_uri: &'a str,
    pub return_idp_credential: bool,
    pub return_secure_token: bool,
}

/// Response of `accounts:signInWithIdp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInWithIdpResponse {
    pub id_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl SignInWithIdpResponse {
    /// Principal for the session; `None` when the account shares no email.
    pub fn principal(&self) -> Option<Principal> {
        let email = self.email.clone().filter(|email| !email.is_empty())?;
        Some(Principal {
            display_name: self.display_name.clone().or_else(|| self.full_name.clone()),
            email,
        })
    }
}

/// Identity Toolkit error body.
#[derive(Debug, Deserialize)]
pub(super) struct FirebaseErrorResponse {
    pub error: FirebaseErrorStatus,
}

#[derive(Debug, Deserialize)]
pub(super) struct FirebaseErrorStatus {
    #[serde(default)]
    pub message: String,
}
