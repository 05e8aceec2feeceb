//! Session provider: Google sign-in through Firebase Authentication.
//!
//! # OAuth Flow
//!
//! 1. Generate the Google consent URL with `authorization_url()`
//! 2. Redirect the user to Google
//! 3. Google redirects back with an authorization code
//! 4. `exchange_code()` trades the code for a Google ID token, checks its
//!    `nonce` claim against the one sent in step 1, then trades the token at
//!    Firebase `accounts:signInWithIdp` for a Firebase ID token and the
//!    user's profile
//! 5. The Firebase ID token authorizes end-user document store calls
//!
//! There is no refresh: when the Firebase ID token expires the store starts
//! rejecting calls and the user signs in again.

mod types;

pub use types::Authenticated;

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use crate::config::{FirebaseConfig, GoogleOAuthConfig};
use crate::store::StoreToken;
use types::{
    FirebaseErrorResponse, GoogleErrorResponse, GoogleIdClaims, GoogleTokenResponse,
    SignInWithIdpRequest, SignInWithIdpResponse,
};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const FIREBASE_SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp";

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the code or token.
    #[error("Identity provider rejected sign-in: {0}")]
    Rejected(String),

    /// The provider answered without the data sign-in needs.
    #[error("Incomplete identity response: {0}")]
    Incomplete(&'static str),
}

/// Interactive identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the user is sent to for the interactive challenge.
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String;

    /// Complete sign-in with the code returned to `redirect_uri`.
    ///
    /// `nonce` is the value passed to [`Self::authorization_url`] for this
    /// attempt.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        nonce: &str,
    ) -> Result<Authenticated, AuthError>;
}

/// Check the `nonce` claim of a Google ID token.
///
/// The token comes straight from Google's token endpoint over TLS, so only
/// the claims are read; the signature is not checked here.
fn verify_nonce(id_token: &str, expected: &str) -> Result<(), AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let claims = jsonwebtoken::decode::<GoogleIdClaims>(
        id_token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )
    .map_err(|e| AuthError::Rejected(format!("unreadable Google ID token: {e}")))?
    .claims;

    match claims.nonce {
        Some(nonce) if nonce == expected => Ok(()),
        Some(_) => Err(AuthError::Rejected("nonce mismatch".to_string())),
        None => Err(AuthError::Incomplete("nonce")),
    }
}

/// Google OAuth client backed by Firebase Authentication.
#[derive(Clone)]
pub struct GoogleIdentity {
    inner: Arc<GoogleIdentityInner>,
}

struct GoogleIdentityInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    api_key: String,
}

impl GoogleIdentity {
    #[must_use]
    pub fn new(google: &GoogleOAuthConfig, firebase: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(GoogleIdentityInner {
                client: reqwest::Client::new(),
                client_id: google.client_id.clone(),
                client_secret: google.client_secret.clone(),
                api_key: firebase.api_key.clone(),
            }),
        }
    }

    /// Exchange the authorization code for a Google ID token.
    async fn google_id_token(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorResponse>(&text).map_or_else(
                |_| format!("token exchange failed ({status}): {text}"),
                |e| format!("{}: {}", e.error, e.error_description.unwrap_or_default()),
            );
            return Err(AuthError::Rejected(message));
        }

        let token: GoogleTokenResponse = response.json().await?;
        token.id_token.ok_or(AuthError::Incomplete("id_token"))
    }

    /// Trade a Google ID token for a Firebase session.
    async fn firebase_sign_in(
        &self,
        google_id_token: &str,
        redirect_uri: &str,
    ) -> Result<SignInWithIdpResponse, AuthError> {
        let url = format!(
            "{FIREBASE_SIGN_IN_URL}?key={}",
            urlencoding::encode(&self.inner.api_key)
        );
        let body = SignInWithIdpRequest {
            post_body: format!(
                "id_token={}&providerId=google.com",
                urlencoding::encode(google_id_token)
            ),
            request_uri: redirect_uri,
            return_idp_credential: true,
            return_secure_token: true,
        };

        let response = self.inner.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FirebaseErrorResponse>(&text)
                .map_or_else(|_| format!("sign-in failed ({status}): {text}"), |e| e.error.message);
            return Err(AuthError::Rejected(message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "{GOOGLE_AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20profile&\
            prompt=select_account&\
            state={}&\
            nonce={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    #[instrument(skip(self, code, nonce))]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        nonce: &str,
    ) -> Result<Authenticated, AuthError> {
        let google_id_token = self.google_id_token(code, redirect_uri).await?;
        verify_nonce(&google_id_token, nonce)?;
        let session = self.firebase_sign_in(&google_id_token, redirect_uri).await?;

        let principal = session.principal().ok_or(AuthError::Incomplete("email"))?;
        Ok(Authenticated {
            principal,
            store_token: StoreToken::new(session.id_token),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::firestore::ServiceAccountKey;
    use crate::store::firestore::credentials::TEST_SERVICE_ACCOUNT_JSON;

    fn identity() -> GoogleIdentity {
        let google = GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("GOCSPX-3fQ9zL1mT8vK2rB7nW4yH6dJ0c"),
        };
        let firebase = FirebaseConfig {
            project_id: "demo-project".to_string(),
            api_key: "AIzaDemoKey".to_string(),
            collection: "users".to_string(),
            service_account: ServiceAccountKey::from_json(TEST_SERVICE_ACCOUNT_JSON).unwrap(),
        };
        GoogleIdentity::new(&google, &firebase)
    }

    #[test]
    fn test_authorization_url() {
        let url = identity().authorization_url(
            "http://localhost:3000/auth/callback",
            "state123",
            "nonce456",
        );

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=state123"));
        assert!(url.contains("nonce=nonce456"));
    }

    fn google_id_token(claims: &serde_json::Value) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_nonce_accepts_matching_claim() {
        let token = google_id_token(&serde_json::json!({
            "iss": "https://accounts.google.com",
            "aud": "client-123.apps.googleusercontent.com",
            "email": "ada@example.com",
            "nonce": "nonce456"
        }));
        assert!(verify_nonce(&token, "nonce456").is_ok());
    }

    #[test]
    fn test_verify_nonce_rejects_other_claim() {
        let token = google_id_token(&serde_json::json!({ "nonce": "replayed" }));
        assert!(matches!(
            verify_nonce(&token, "nonce456"),
            Err(AuthError::Rejected(_))
        ));
    }

    #[test]
    fn test_verify_nonce_requires_claim() {
        let token = google_id_token(&serde_json::json!({ "email": "ada@example.com" }));
        assert!(matches!(
            verify_nonce(&token, "nonce456"),
            Err(AuthError::Incomplete("nonce"))
        ));
    }

    #[test]
    fn test_verify_nonce_rejects_garbage() {
        assert!(matches!(
            verify_nonce("not-a-jwt", "nonce456"),
            Err(AuthError::Rejected(_))
        ));
    }

    #[test]
    fn test_sign_in_response_principal() {
        let response: SignInWithIdpResponse = serde_json::from_value(serde_json::json!({
            "idToken": "firebase-id-token",
            "email": "ada@example.com",
            "displayName": "Ada Lovelace",
            "localId": "uid-1"
        }))
        .unwrap();

        let principal = response.principal().unwrap();
        assert_eq!(principal.email, "ada@example.com");
        assert_eq!(principal.display_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_sign_in_response_without_email() {
        let response: SignInWithIdpResponse = serde_json::from_value(serde_json::json!({
            "idToken": "firebase-id-token",
            "fullName": "Anonymous"
        }))
        .unwrap();
        assert!(response.principal().is_none());
    }

    #[test]
    fn test_sign_in_request_body() {
        let body = SignInWithIdpRequest {
            post_body: "id_token=abc&providerId=google.com".to_string(),
            request_uri: "http://localhost:3000/auth/callback",
            return_idp_credential: true,
            return_secure_token: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["postBody"], "id_token=abc&providerId=google.com");
        assert_eq!(json["returnSecureToken"], true);
    }
}
