//! The process-wide session store.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{CredentialPair, Session};

/// Holds the one [`Session`] this client runs under.
///
/// Pure state, no I/O. Credentials are only ever written as a pair through
/// [`SessionStore::install`], which is the completion step of a successful
/// refresh exchange (or the initial load from persisted storage); a failed
/// refresh never reaches this type, so a still-possibly-valid pair is never
/// erased by a transient network error.
pub struct SessionStore {
    inner: RwLock<Session>,
}

impl SessionStore {
    /// Creates an empty, unauthenticated session store.
    pub fn new() -> Self {
        Self { inner: RwLock::new(Session::default()) }
    }

    /// Creates a session store seeded from persisted storage.
    pub fn from_pair(pair: Option<CredentialPair>) -> Self {
        let session = match pair {
            Some(pair) => Session {
                access_credential: Some(pair.access_credential),
                refresh_credential: Some(pair.refresh_credential),
                last_activity_at: Some(Utc::now()),
            },
            None => Session::default(),
        };
        Self { inner: RwLock::new(session) }
    }

    /// The current access credential, if any.
    pub async fn access_credential(&self) -> Option<String> {
        self.inner.read().await.access_credential.clone()
    }

    /// The current refresh credential, if any.
    pub async fn refresh_credential(&self) -> Option<String> {
        self.inner.read().await.refresh_credential.clone()
    }

    /// Atomically replaces both credentials and touches the activity
    /// timestamp.
    pub async fn install(&self, pair: CredentialPair) {
        let mut session = self.inner.write().await;
        session.access_credential = Some(pair.access_credential);
        session.refresh_credential = Some(pair.refresh_credential);
        session.last_activity_at = Some(Utc::now());
    }

    /// Records authenticated activity without touching credentials.
    pub async fn touch(&self) {
        self.inner.write().await.last_activity_at = Some(Utc::now());
    }

    /// Clears the session entirely (logout).
    pub async fn clear(&self) {
        *self.inner.write().await = Session::default();
    }

    /// Returns a point-in-time copy of the session.
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
