//! Test doubles shared by router tests and the integration-tests crate.
//!
//! Compiled for unit tests and with the `test-support` feature.

use async_trait::async_trait;
use profile_hub_core::Principal;

use crate::services::identity::{AuthError, Authenticated, IdentityProvider};
use crate::store::StoreToken;

/// Authorization code accepted by [`StaticIdentity`].
pub const GOOD_CODE: &str = "good-code";

/// Identity provider that signs in as Ada for [`GOOD_CODE`] without any network.
pub struct StaticIdentity;

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        format!(
            "https://idp.test/authorize?redirect_uri={}&state={}&nonce={}",
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
            urlencoding::encode(nonce)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
        nonce: &str,
    ) -> Result<Authenticated, AuthError> {
        if code != GOOD_CODE {
            return Err(AuthError::Rejected("invalid_grant".to_string()));
        }
        if nonce.is_empty() {
            return Err(AuthError::Incomplete("nonce"));
        }
        Ok(Authenticated {
            principal: Principal {
                display_name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            },
            store_token: StoreToken::new("test-id-token"),
        })
    }
}

/// Full router over the given in-memory store.
#[cfg(test)]
pub(crate) fn test_app(store: std::sync::Arc<crate::store::MemoryStore>) -> axum::Router {
    use std::sync::Arc;

    use crate::state::AppState;

    crate::app(AppState::new(
        crate::config::test_config(),
        Arc::new(StaticIdentity),
        store,
    ))
}
