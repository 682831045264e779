//! Error types for the authentication modules.

use thiserror::Error;

use crate::providers::SourceError;

/// Errors raised by the session, coordinator, and dispatcher.
///
/// A 401 response is never represented here; the dispatcher returns it as an
/// ordinary response value. These variants cover the cases where no response
/// could be produced at all.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The session holds no refresh credential, so a refresh exchange cannot
    /// even be attempted.
    #[error("No refresh credential available")]
    NoRefreshCredential,

    /// The session holds no access credential to attach to a request.
    #[error("No access credential available")]
    NoAccessCredential,

    /// The refresh exchange itself failed. The prior session is kept; the
    /// next 401 will try again.
    #[error("Credential refresh failed: {0}")]
    RefreshFailed(#[source] SourceError),

    /// A request could not be sent or produced no response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// A request path could not be joined onto the API base URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
