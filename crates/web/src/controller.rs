//! Profile form controller.
//!
//! A browser session is either signed out (no [`SignedInForm`] stored) or
//! signed in. The signed-in state owns the draft being edited, the optional
//! edit target and the last fetched record list, and is persisted in the
//! session between requests.
//!
//! Every successful mutation is followed by a full re-list. Failed calls
//! leave the state untouched; validation failures additionally leave a
//! one-shot notice for the next render.

use profile_hub_core::{Principal, ProfileDraft, ProfileId, ProfileRecord};
use serde::{Deserialize, Serialize};

use crate::services::identity::Authenticated;
use crate::services::records::{RecordError, RecordStoreClient};
use crate::store::{StoreAuth, StoreToken};

/// Signed-in session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedInForm {
    pub principal: Principal,
    store_token: StoreToken,
    pub draft: ProfileDraft,
    pub editing: Option<ProfileId>,
    pub records: Vec<ProfileRecord>,
    notice: Option<String>,
}

impl SignedInForm {
    /// Enter the signed-in state and fetch the record list once.
    ///
    /// A failed initial fetch is logged and leaves the list empty.
    pub async fn enter(records: &RecordStoreClient, authenticated: Authenticated) -> Self {
        let mut form = Self {
            principal: authenticated.principal,
            store_token: authenticated.store_token,
            draft: ProfileDraft::default(),
            editing: None,
            records: Vec::new(),
            notice: None,
        };

        if let Err(e) = form.refresh(records).await {
            tracing::warn!(error = %e, "initial profile list failed");
        }
        form
    }

    fn auth(&self) -> StoreAuth<'_> {
        StoreAuth::User(&self.store_token)
    }

    /// Re-fetch the record list.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable`; the previous list is kept.
    pub async fn refresh(&mut self, records: &RecordStoreClient) -> Result<(), RecordError> {
        self.records = records.list(self.auth()).await?;
        Ok(())
    }

    /// Replace the draft with the submitted form values.
    pub fn set_draft(&mut self, draft: ProfileDraft) {
        self.draft = draft;
    }

    /// Persist the draft: update the edit target if there is one, create otherwise.
    ///
    /// On success the draft resets, editing ends and the list is re-fetched.
    ///
    /// # Errors
    ///
    /// Returns `Validation` (also recorded as a notice), `NotFound` when the
    /// edit target is gone, or `StoreUnavailable`.
    pub async fn submit(&mut self, records: &RecordStoreClient) -> Result<(), RecordError> {
        let result = match &self.editing {
            Some(id) => records.update(self.auth(), id, &self.draft).await,
            None => records.create(self.auth(), &self.draft).await.map(|_| ()),
        };

        if let Err(RecordError::Validation(e)) = &result {
            self.notice = Some(e.user_message().to_string());
        }
        result?;

        self.draft = ProfileDraft::default();
        self.editing = None;
        self.refresh(records).await
    }

    /// Load a listed record into the draft and make it the edit target.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the current list.
    pub fn begin_edit(&mut self, id: &ProfileId) -> Result<(), RecordError> {
        let record = self
            .records
            .iter()
            .find(|record| &record.id == id)
            .ok_or_else(|| RecordError::NotFound(id.clone()))?;

        self.draft = record.to_draft();
        self.editing = Some(record.id.clone());
        Ok(())
    }

    /// Leave edit mode and restore the default draft.
    pub fn cancel_edit(&mut self) {
        self.draft = ProfileDraft::default();
        self.editing = None;
    }

    /// Delete a record and re-fetch the list.
    ///
    /// Deleting the current edit target also ends editing.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable`.
    pub async fn delete(
        &mut self,
        records: &RecordStoreClient,
        id: &ProfileId,
    ) -> Result<(), RecordError> {
        records.delete(self.auth(), id).await?;

        if self.editing.as_ref() == Some(id) {
            self.cancel_edit();
        }
        self.refresh(records).await
    }

    /// Take the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Name shown in the welcome line.
    #[must_use]
    pub fn greeting(&self) -> &str {
        self.principal.greeting_name()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{DocumentStore, MemoryStore};

    fn setup() -> (Arc<MemoryStore>, RecordStoreClient) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), RecordStoreClient::new(store))
    }

    fn ada_login() -> Authenticated {
        Authenticated {
            principal: Principal {
                display_name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            },
            store_token: StoreToken::new("id-token"),
        }
    }

    fn draft(age: &str, address: &str) -> ProfileDraft {
        ProfileDraft {
            name: "Ada".to_string(),
            age: age.to_string(),
            email: "a@x.com".to_string(),
            phone: "555".to_string(),
            address: address.to_string(),
        }
    }

    #[tokio::test]
    async fn test_enter_lists_once() {
        let (store, client) = setup();
        let form = SignedInForm::enter(&client, ada_login()).await;

        assert_eq!(store.call_count(), 1);
        assert!(form.records.is_empty());
        assert_eq!(form.draft, ProfileDraft::default());
        assert_eq!(form.greeting(), "Ada");
    }

    #[tokio::test]
    async fn test_enter_with_store_outage_starts_empty() {
        let (store, client) = setup();
        store.set_offline(true);
        let form = SignedInForm::enter(&client, ada_login()).await;
        assert!(form.records.is_empty());
    }

    #[tokio::test]
    async fn test_ada_create_edit_delete() {
        let (_, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;

        form.set_draft(draft("30", "NYC"));
        form.submit(&client).await.unwrap();
        assert_eq!(form.records.len(), 1);
        assert_eq!(form.draft, ProfileDraft::default());
        let id = form.records.first().unwrap().id.clone();

        form.begin_edit(&id).unwrap();
        assert_eq!(form.draft, draft("30", "NYC"));
        form.set_draft(draft("31", "NYC"));
        form.submit(&client).await.unwrap();

        let record = form.records.first().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.fields.age, 31);
        assert!(form.editing.is_none());

        form.delete(&client, &id).await.unwrap();
        assert!(form.records.is_empty());
    }

    #[tokio::test]
    async fn test_empty_field_sets_notice_without_store_call() {
        let (store, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        let calls = store.call_count();

        let mut incomplete = draft("30", "NYC");
        incomplete.email.clear();
        form.set_draft(incomplete.clone());

        assert!(matches!(
            form.submit(&client).await,
            Err(RecordError::Validation(_))
        ));
        assert_eq!(store.call_count(), calls);
        assert_eq!(form.draft, incomplete);
        assert_eq!(form.take_notice().as_deref(), Some("Please fill all fields!"));
        assert!(form.take_notice().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let (store, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        form.set_draft(draft("30", "NYC"));
        form.submit(&client).await.unwrap();

        store.set_offline(true);
        assert!(form.refresh(&client).await.is_err());
        assert_eq!(form.records.len(), 1);
    }

    #[tokio::test]
    async fn test_update_of_removed_record_keeps_draft() {
        let (store, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        form.set_draft(draft("30", "NYC"));
        form.submit(&client).await.unwrap();
        let id = form.records.first().unwrap().id.clone();

        form.begin_edit(&id).unwrap();
        let token = StoreToken::new("other-tab");
        store.delete(StoreAuth::User(&token), &id).await.unwrap();

        form.set_draft(draft("40", "Paris"));
        assert!(matches!(
            form.submit(&client).await,
            Err(RecordError::NotFound(_))
        ));
        assert_eq!(form.editing.as_ref(), Some(&id));
        assert_eq!(form.draft, draft("40", "Paris"));
    }

    #[tokio::test]
    async fn test_cancel_edit_restores_default_draft() {
        let (_, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        form.set_draft(draft("30", "NYC"));
        form.submit(&client).await.unwrap();
        let id = form.records.first().unwrap().id.clone();

        form.begin_edit(&id).unwrap();
        form.cancel_edit();
        assert!(form.editing.is_none());
        assert_eq!(form.draft, ProfileDraft::default());
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_id() {
        let (_, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        assert!(matches!(
            form.begin_edit(&ProfileId::new("nope")),
            Err(RecordError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleting_edit_target_ends_editing() {
        let (_, client) = setup();
        let mut form = SignedInForm::enter(&client, ada_login()).await;
        form.set_draft(draft("30", "NYC"));
        form.submit(&client).await.unwrap();
        let id = form.records.first().unwrap().id.clone();

        form.begin_edit(&id).unwrap();
        form.delete(&client, &id).await.unwrap();
        assert!(form.editing.is_none());
        assert_eq!(form.draft, ProfileDraft::default());
    }
}
