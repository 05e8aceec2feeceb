//! Record store client.
//!
//! Validates drafts before any network call, then forwards to the
//! configured [`DocumentStore`]. Callers are expected to re-list after every
//! successful mutation rather than patching local state.

use std::sync::Arc;

use profile_hub_core::{ProfileDocument, ProfileDraft, ProfileId, ProfileRecord, ValidationError};
use thiserror::Error;

use crate::store::{DocumentStore, StoreAuth, StoreError};

/// Errors from record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Missing or malformed field, detected before any store call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Network or permission failure talking to the store.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The target record no longer exists.
    #[error("Record not found: {0}")]
    NotFound(ProfileId),
}

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
            StoreError::NotFound(id) => Self::NotFound(id),
        }
    }
}

/// Client for the profile collection.
#[derive(Clone)]
pub struct RecordStoreClient {
    store: Arc<dyn DocumentStore>,
}

impl RecordStoreClient {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All records in store-default order.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on network or permission failure.
    pub async fn list(&self, auth: StoreAuth<'_>) -> Result<Vec<ProfileRecord>, RecordError> {
        Ok(self.store.list(auth).await?)
    }

    /// Validate a draft and insert it as a new five-field record.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without touching the store, or `StoreUnavailable`.
    pub async fn create(
        &self,
        auth: StoreAuth<'_>,
        draft: &ProfileDraft,
    ) -> Result<ProfileId, RecordError> {
        let fields = draft.validate()?;
        let id = self.store.add(auth, &ProfileDocument::Full(fields)).await?;
        tracing::info!(id = %id, auth = auth.label(), "profile created");
        Ok(id)
    }

    /// Validate a draft and replace all five fields of `id`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without touching the store, `NotFound` if `id`
    /// no longer exists, or `StoreUnavailable`.
    pub async fn update(
        &self,
        auth: StoreAuth<'_>,
        id: &ProfileId,
        draft: &ProfileDraft,
    ) -> Result<(), RecordError> {
        let fields = draft.validate()?;
        self.store.update(auth, id, &fields).await?;
        tracing::info!(id = %id, auth = auth.label(), "profile updated");
        Ok(())
    }

    /// Delete `id`. Deleting an absent record succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on network or permission failure.
    pub async fn delete(&self, auth: StoreAuth<'_>, id: &ProfileId) -> Result<(), RecordError> {
        self.store.delete(auth, id).await?;
        tracing::info!(id = %id, auth = auth.label(), "profile deleted");
        Ok(())
    }

    /// Privileged two-field insert used by the submit endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the service credentials or the store fail.
    pub async fn submit(&self, name: String, age: u32) -> Result<ProfileId, RecordError> {
        let id = self
            .store
            .add(StoreAuth::Service, &ProfileDocument::NameAge { name, age })
            .await?;
        tracing::info!(id = %id, "profile submitted via API");
        Ok(id)
    }
}
