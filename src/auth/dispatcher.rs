//! The authenticated request dispatcher: bearer attachment, 401 detection,
//! and the single coordinated replay.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use super::{coordinator::RefreshCoordinator, error::AuthError, session::SessionStore};

/// A replayable description of one outbound API call.
///
/// The dispatcher may send a request twice (once per credential), so it works
/// from this template rather than a consumed request builder.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a GET request for a path relative to the API base URL.
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), query: Vec::new() }
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The request path relative to the API base URL.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Wraps every outbound authenticated call.
///
/// A 401 is a valid, inspectable response, not an exception: the dispatcher
/// asks the coordinator for a renewed credential and replays the original
/// request exactly once. A second consecutive 401, or a failed renewal,
/// passes the 401 through to the caller unchanged.
pub struct AuthDispatcher {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
    session: Arc<SessionStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthDispatcher {
    /// Creates a dispatcher over the shared HTTP client and session.
    pub fn new(
        base_url: Url,
        client: Arc<ClientWithMiddleware>,
        session: Arc<SessionStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self { base_url, client, session, coordinator }
    }

    /// Sends an authenticated request, transparently renewing the credential
    /// and replaying once on authorization failure.
    pub async fn dispatch(&self, request: &ApiRequest) -> Result<Response, AuthError> {
        let credential =
            self.session.access_credential().await.ok_or(AuthError::NoAccessCredential)?;

        let response = self.send(request, &credential).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            self.session.touch().await;
            return Ok(response);
        }

        let renewed = match self.coordinator.ensure_fresh(&credential).await {
            Ok(renewed) => renewed,
            Err(e) => {
                tracing::debug!(
                    path = request.path(),
                    error = %e,
                    "Credential renewal unavailable; surfacing original 401"
                );
                return Ok(response);
            }
        };
        if renewed == credential {
            // The coordinator could not improve on what we already used.
            return Ok(response);
        }

        tracing::debug!(path = request.path(), "Replaying request with renewed credential");
        let replayed = self.send(request, &renewed).await?;
        if replayed.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                path = request.path(),
                "Request rejected again after credential renewal"
            );
        } else {
            self.session.touch().await;
        }
        Ok(replayed)
    }

    async fn send(&self, request: &ApiRequest, credential: &str) -> Result<Response, AuthError> {
        let url = self.base_url.join(&request.path)?;
        let mut builder = self.client.request(request.method.clone(), url).bearer_auth(credential);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        Ok(builder.send().await?)
    }
}
