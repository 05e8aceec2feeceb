//! Cloud Firestore REST client.
//!
//! Talks to `https://firestore.googleapis.com/v1` directly with `reqwest`.
//!
//! # Credentials
//!
//! - [`StoreAuth::User`]: the signed-in user's Firebase ID token as a bearer
//!   token, plus the project's web API key.
//! - [`StoreAuth::Service`]: a service account access token minted by
//!   [`ServiceTokenSource`].
//!
//! # Example
//!
//! ```rust,ignore
//! use profile_hub_web::store::{DocumentStore, FirestoreStore, StoreAuth};
//!
//! let store = FirestoreStore::new(&config.firebase)?;
//! let records = store.list(StoreAuth::Service).await?;
//! ```

pub mod credentials;
mod values;

pub use credentials::{CredentialsError, ServiceAccountKey, ServiceTokenSource};

use std::sync::Arc;

use async_trait::async_trait;
use profile_hub_core::{ProfileDocument, ProfileField, ProfileFields, ProfileId, ProfileRecord};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use super::{DocumentStore, StoreAuth, StoreError};
use crate::config::FirebaseConfig;
use values::{DocumentBody, ErrorEnvelope, ListDocumentsResponse};

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per list page.
const PAGE_SIZE: &str = "300";

/// Firestore-backed document store for one collection.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreStoreInner>,
}

struct FirestoreStoreInner {
    client: reqwest::Client,
    collection_url: Url,
    api_key: String,
    service: ServiceTokenSource,
}

impl FirestoreStore {
    /// Create a client for the configured project and collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or collection produce an invalid URL.
    pub fn new(config: &FirebaseConfig) -> Result<Self, url::ParseError> {
        Self::with_base_url(config, FIRESTORE_API)
    }

    /// Create a client against another API root, such as a local emulator.
    ///
    /// `base_url` includes the version segment, e.g. `http://127.0.0.1:8080/v1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base, project or collection produce an invalid URL.
    pub fn with_base_url(
        config: &FirebaseConfig,
        base_url: &str,
    ) -> Result<Self, url::ParseError> {
        let collection_url = Url::parse(&format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            base_url.trim_end_matches('/'),
            config.project_id,
            config.collection
        ))?;

        Ok(Self {
            inner: Arc::new(FirestoreStoreInner {
                client: reqwest::Client::new(),
                collection_url,
                api_key: config.api_key.clone(),
                service: ServiceTokenSource::new(config.service_account.clone()),
            }),
        })
    }

    /// URL of one document in the collection.
    fn document_url(&self, id: &ProfileId) -> Result<Url, StoreError> {
        let mut url = self.inner.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Unavailable("collection URL cannot be a base".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    /// Build an authorized request for `url`.
    ///
    /// End-user requests carry the API key as a `key` query parameter.
    async fn request(
        &self,
        method: Method,
        mut url: Url,
        auth: StoreAuth<'_>,
    ) -> Result<RequestBuilder, StoreError> {
        let bearer = match auth {
            StoreAuth::User(token) => {
                url.query_pairs_mut().append_pair("key", &self.inner.api_key);
                token.expose().to_string()
            }
            StoreAuth::Service => self
                .inner
                .service
                .access_token(&self.inner.client)
                .await?
                .expose_secret()
                .to_string(),
        };

        Ok(self
            .inner
            .client
            .request(method, url)
            .bearer_auth(bearer)
            .header("User-Agent", "ProfileHub/1.0"))
    }
}

/// Turn a non-success response into a store error.
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&text).map_or(text, |envelope| {
        format!("{}: {}", envelope.error.status, envelope.error.message)
    });
    Err(StoreError::Unavailable(format!(
        "Firestore request failed ({status}): {detail}"
    )))
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[instrument(skip(self, document), fields(auth = auth.label()))]
    async fn add(
        &self,
        auth: StoreAuth<'_>,
        document: &ProfileDocument,
    ) -> Result<ProfileId, StoreError> {
        let url = self.inner.collection_url.clone();
        let response = self
            .request(Method::POST, url, auth)
            .await?
            .json(&values::encode_document(document))
            .send()
            .await?;

        let created: values::Document = check(response).await?.json().await?;
        values::document_id(&created.name)
    }

    #[instrument(skip(self), fields(auth = auth.label()))]
    async fn list(&self, auth: StoreAuth<'_>) -> Result<Vec<ProfileRecord>, StoreError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.inner.collection_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.request(Method::GET, url, auth).await?.send().await?;
            let page: ListDocumentsResponse = check(response).await?.json().await?;

            for document in page.documents {
                records.push(values::decode_document(document)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = records.len(), "listed profile documents");
        Ok(records)
    }

    #[instrument(skip(self, fields), fields(auth = auth.label(), id = %id))]
    async fn update(
        &self,
        auth: StoreAuth<'_>,
        id: &ProfileId,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        let mut url = self.document_url(id)?;
        {
            let mut query = url.query_pairs_mut();
            for field in ProfileField::ALL {
                query.append_pair("updateMask.fieldPaths", field.key());
            }
            query.append_pair("currentDocument.exists", "true");
        }

        let response = self
            .request(Method::PATCH, url, auth)
            .await?
            .json(&DocumentBody {
                fields: values::encode_fields(fields),
            })
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(auth = auth.label(), id = %id))]
    async fn delete(&self, auth: StoreAuth<'_>, id: &ProfileId) -> Result<(), StoreError> {
        let url = self.document_url(id)?;
        let response = self.request(Method::DELETE, url, auth).await?.send().await?;

        // Firestore answers 200 for absent documents; a 404 here means the same thing
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}
