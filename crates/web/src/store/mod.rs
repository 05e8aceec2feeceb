//! Document store access for the profile collection.
//!
//! # Architecture
//!
//! - [`DocumentStore`] is the seam between the record client and the hosted
//!   database: collection-scoped add/list/update/delete keyed by
//!   store-assigned identifiers.
//! - [`firestore::FirestoreStore`] talks to Cloud Firestore over REST.
//! - [`memory::MemoryStore`] keeps documents in process with the same
//!   semantics; used by tests and local runs without a Firebase project.
//!
//! Every call carries a [`StoreAuth`] saying whose credentials to use:
//! the signed-in user's Firebase ID token, or the service account.

pub mod firestore;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use profile_hub_core::{ProfileDocument, ProfileFields, ProfileId, ProfileRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Errors returned by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network, permission or decoding failure talking to the store.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// The target document does not exist.
    #[error("Document not found: {0}")]
    NotFound(ProfileId),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// End-user store credential (a Firebase ID token).
///
/// Kept in the session next to the principal. Implements `Debug` manually
/// to redact the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreToken(String);

impl StoreToken {
    /// Wrap a raw ID token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The bearer value sent to the store.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StoreToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreToken([REDACTED])")
    }
}

/// Credentials used for one store call.
#[derive(Debug, Clone, Copy)]
pub enum StoreAuth<'a> {
    /// Signed-in end user.
    User(&'a StoreToken),
    /// Elevated service-account access.
    Service,
}

impl StoreAuth<'_> {
    /// Short label for log fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Service => "service",
        }
    }
}

/// Collection-scoped document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its store-assigned identifier.
    async fn add(
        &self,
        auth: StoreAuth<'_>,
        document: &ProfileDocument,
    ) -> Result<ProfileId, StoreError>;

    /// Every document in the collection, in store-default order.
    async fn list(&self, auth: StoreAuth<'_>) -> Result<Vec<ProfileRecord>, StoreError>;

    /// Replace all five business fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] when `id` does not exist.
    async fn update(
        &self,
        auth: StoreAuth<'_>,
        id: &ProfileId,
        fields: &ProfileFields,
    ) -> Result<(), StoreError>;

    /// Remove a document. Removing an absent identifier succeeds.
    async fn delete(&self, auth: StoreAuth<'_>, id: &ProfileId) -> Result<(), StoreError>;
}
