//! A JSON-file-backed implementation of the preference store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{error::PersistenceError, traits::PreferenceStore};
use crate::models::CredentialPair;

/// The full persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<CredentialPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll_interval_ms: Option<u64>,
}

/// Persists preferences as a single JSON document, rewritten atomically via a
/// temp-file rename on every mutation.
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles against the file.
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    /// Creates a store backed by the given file path. The file is created on
    /// first write; a missing file reads as empty preferences.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), write_lock: Mutex::new(()) }
    }

    async fn read(&self) -> Result<Preferences, PersistenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, preferences: &Preferences) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(preferences)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, mutate: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut Preferences),
    {
        let _guard = self.write_lock.lock().await;
        let mut preferences = self.read().await?;
        mutate(&mut preferences);
        self.write(&preferences).await
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load_credentials(&self) -> Result<Option<CredentialPair>, PersistenceError> {
        Ok(self.read().await?.credentials)
    }

    async fn store_credentials(&self, pair: &CredentialPair) -> Result<(), PersistenceError> {
        let pair = pair.clone();
        self.update(move |p| p.credentials = Some(pair)).await
    }

    async fn clear_credentials(&self) -> Result<(), PersistenceError> {
        self.update(|p| p.credentials = None).await
    }

    async fn poll_interval_ms(&self) -> Result<Option<u64>, PersistenceError> {
        Ok(self.read().await?.poll_interval_ms)
    }

    async fn set_poll_interval_ms(&self, interval_ms: u64) -> Result<(), PersistenceError> {
        self.update(move |p| p.poll_interval_ms = Some(interval_ms)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FilePreferenceStore {
        FilePreferenceStore::new(dir.path().join("preferences.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load_credentials().await.unwrap(), None);
        assert_eq!(store.poll_interval_ms().await.unwrap(), None);
    }

    #[tokio::test]
    async fn credentials_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let pair = CredentialPair::new("acc-1", "ref-1");

        store.store_credentials(&pair).await.unwrap();
        assert_eq!(store.load_credentials().await.unwrap(), Some(pair));

        store.clear_credentials().await.unwrap();
        assert_eq!(store.load_credentials().await.unwrap(), None);
    }

    #[tokio::test]
    async fn poll_interval_survives_credential_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set_poll_interval_ms(30_000).await.unwrap();
        store.store_credentials(&CredentialPair::new("a", "r")).await.unwrap();

        assert_eq!(store.poll_interval_ms().await.unwrap(), Some(30_000));
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        let store = FilePreferenceStore::new(&path);
        assert!(matches!(
            store.load_credentials().await,
            Err(PersistenceError::Serialization(_))
        ));
    }
}
