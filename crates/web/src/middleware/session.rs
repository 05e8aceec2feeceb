//! Session middleware configuration.
//!
//! Sessions live in a bounded `moka` cache. A session that sees no request
//! for [`SESSION_IDLE_TIMEOUT`] is evicted, and the cache never holds more
//! than [`SESSION_CAPACITY`] sessions. The cookie has no max-age, so the
//! signed-in state also ends with the browser session or a server restart.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "profile_hub_session";

/// Idle time after which a session is dropped. Matches the Firebase ID token lifetime.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Maximum number of sessions held at once.
pub const SESSION_CAPACITY: u64 = 10_000;

/// In-process session store with idle eviction.
#[derive(Clone)]
pub struct MokaSessionStore {
    cache: Cache<Id, Record>,
}

impl MokaSessionStore {
    #[must_use]
    pub fn new(max_capacity: u64, idle_timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle_timeout)
            .build();
        Self { cache }
    }

    /// Approximate number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MokaSessionStore {
    fn default() -> Self {
        Self::new(SESSION_CAPACITY, SESSION_IDLE_TIMEOUT)
    }
}

// Records hold ID tokens; never print them.
impl fmt::Debug for MokaSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaSessionStore")
            .field("sessions", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer over a fresh [`MokaSessionStore`].
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MokaSessionStore> {
    SessionManagerLayer::new(MokaSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnSessionEnd)
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
