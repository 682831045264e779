//! This module contains the error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// An error occurred while reading or writing the preference file.
    #[error("A preference store operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during serialization or deserialization.
    #[error("Failed to serialize or deserialize preferences: {0}")]
    Serialization(#[from] serde_json::Error),
}
