//! The key-value contract this core holds with the persistence layer.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistenceError;
use crate::models::CredentialPair;

/// Get/set access to the locally persisted state this core consumes: the
/// credential pair and the poll-interval preference. The storage medium and
/// format belong to the implementation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Loads the persisted credential pair, if one exists.
    async fn load_credentials(&self) -> Result<Option<CredentialPair>, PersistenceError>;

    /// Persists a credential pair, replacing any previous one.
    async fn store_credentials(&self, pair: &CredentialPair) -> Result<(), PersistenceError>;

    /// Removes the persisted credential pair.
    async fn clear_credentials(&self) -> Result<(), PersistenceError>;

    /// Loads the persisted poll-interval preference in milliseconds.
    async fn poll_interval_ms(&self) -> Result<Option<u64>, PersistenceError>;

    /// Persists the poll-interval preference in milliseconds.
    async fn set_poll_interval_ms(&self, interval_ms: u64) -> Result<(), PersistenceError>;
}
