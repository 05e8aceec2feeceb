//! In-process document store.
//!
//! Mirrors the Firestore semantics the app depends on: identifiers are
//! assigned on insert, list order is insertion order, updates require the
//! document to exist and deleting an absent document is a no-op. Credentials
//! are accepted but not checked.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use profile_hub_core::{ProfileDocument, ProfileFields, ProfileId, ProfileRecord};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DocumentStore, StoreAuth, StoreError};

/// Document store backed by a vector in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<ProfileRecord>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls received so far, including failed ones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Simulate an outage: while offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of the stored documents.
    pub async fn snapshot(&self) -> Vec<ProfileRecord> {
        self.documents.read().await.clone()
    }

    fn begin_call(&self, operation: &str, auth: StoreAuth<'_>) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(operation, auth = auth.label(), "memory store call");

        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(
        &self,
        auth: StoreAuth<'_>,
        document: &ProfileDocument,
    ) -> Result<ProfileId, StoreError> {
        self.begin_call("add", auth)?;

        let id = ProfileId::new(Uuid::new_v4().simple().to_string());
        self.documents.write().await.push(ProfileRecord {
            id: id.clone(),
            fields: document.clone().into_fields(),
        });
        Ok(id)
    }

    async fn list(&self, auth: StoreAuth<'_>) -> Result<Vec<ProfileRecord>, StoreError> {
        self.begin_call("list", auth)?;
        Ok(self.snapshot().await)
    }

    async fn update(
        &self,
        auth: StoreAuth<'_>,
        id: &ProfileId,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        self.begin_call("update", auth)?;

        let mut documents = self.documents.write().await;
        let record = documents
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.fields = fields.clone();
        Ok(())
    }

    async fn delete(&self, auth: StoreAuth<'_>, id: &ProfileId) -> Result<(), StoreError> {
        self.begin_call("delete", auth)?;

        self.documents.write().await.retain(|record| &record.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(name: &str, age: u32) -> ProfileFields {
        ProfileFields {
            name: name.to_string(),
            age,
            email: format!("{}@x.com", name.to_lowercase()),
            phone: "555".to_string(),
            address: "NYC".to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store
            .add(StoreAuth::Service, &ProfileDocument::Full(fields("Ada", 30)))
            .await
            .unwrap();
        let b = store
            .add(StoreAuth::Service, &ProfileDocument::Full(fields("Ada", 30)))
            .await
            .unwrap();

        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
        assert_eq!(store.list(StoreAuth::Service).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        for name in ["Ada", "Bob", "Cy"] {
            store
                .add(StoreAuth::Service, &ProfileDocument::Full(fields(name, 1)))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list(StoreAuth::Service)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.fields.name)
            .collect();
        assert_eq!(names, ["Ada", "Bob", "Cy"]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .update(StoreAuth::Service, &ProfileId::new("gone"), &fields("Ada", 31))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id.as_str() == "gone"));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        store
            .delete(StoreAuth::Service, &ProfileId::new("gone"))
            .await
            .unwrap();
        assert!(store.list(StoreAuth::Service).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_fails_and_counts_calls() {
        let store = MemoryStore::new();
        store.set_offline(true);

        let result = store.list(StoreAuth::Service).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.call_count(), 1);
    }
}
