//! Collaborator interfaces consumed by the synchronization core.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::SourceError;
use crate::models::CredentialPair;

/// The authentication collaborator: credential refresh and validation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthExchange: Send + Sync {
    /// Exchanges a refresh credential for a new credential pair.
    async fn refresh(&self, refresh_credential: &str) -> Result<CredentialPair, SourceError>;

    /// Checks whether an access credential is currently accepted.
    async fn validate(&self, access_credential: &str) -> Result<bool, SourceError>;
}

/// The telemetry collaborator: historical window retrieval.
///
/// Samples are returned as raw JSON values so that ingestion can drop
/// malformed entries individually instead of failing the whole window.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetches the history window for one site.
    async fn history(
        &self,
        site_id: &str,
        window_hours: u32,
    ) -> Result<Vec<serde_json::Value>, SourceError>;
}
