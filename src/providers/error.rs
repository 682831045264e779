//! Error types for the external collaborators.

use thiserror::Error;

/// Errors produced while talking to the auth or telemetry collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a usable response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status.
    #[error("Unexpected status {status} from collaborator")]
    Status {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The dispatcher could not produce an authenticated request at all.
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl From<reqwest_middleware::Error> for SourceError {
    fn from(e: reqwest_middleware::Error) -> Self {
        SourceError::Transport(e.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Transport(e.to_string())
    }
}
