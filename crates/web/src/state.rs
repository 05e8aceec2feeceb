//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::identity::IdentityProvider;
use crate::services::records::RecordStoreClient;
use crate::store::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The identity provider and document store are
/// trait objects so tests can swap in local implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    identity: Arc<dyn IdentityProvider>,
    records: RecordStoreClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                records: RecordStoreClient::new(store),
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the record store client.
    #[must_use]
    pub fn records(&self) -> &RecordStoreClient {
        &self.inner.records
    }
}
