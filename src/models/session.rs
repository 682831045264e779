//! Session and credential data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An access/refresh credential pair as issued by the authentication
/// collaborator.
///
/// The two tokens are opaque to this crate and are only ever replaced
/// together, as a pair, by a successful refresh exchange or an initial load
/// from persisted storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// The short-lived access credential attached to outbound requests.
    pub access_credential: String,
    /// The long-lived refresh credential used to renew the access credential.
    pub refresh_credential: String,
}

impl CredentialPair {
    /// Creates a new credential pair.
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self { access_credential: access.into(), refresh_credential: refresh.into() }
    }
}

/// A point-in-time view of the process-wide session state.
///
/// Exactly one session exists per running client. Either both credentials are
/// present or neither is; a partially-populated session never occurs because
/// credentials are only installed as a [`CredentialPair`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The current access credential, if the session is authenticated.
    pub access_credential: Option<String>,
    /// The current refresh credential, if the session is authenticated.
    pub refresh_credential: Option<String>,
    /// When the session last performed a successful authenticated exchange.
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns `true` when the session holds a credential pair.
    pub fn is_authenticated(&self) -> bool {
        self.access_credential.is_some() && self.refresh_credential.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_session_is_unauthenticated() {
        assert!(!Session::default().is_authenticated());
    }

    #[test]
    fn credential_pair_serializes_with_camel_case_keys() {
        let pair = CredentialPair::new("acc-1", "ref-1");
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessCredential"], "acc-1");
        assert_eq!(json["refreshCredential"], "ref-1");
    }
}
