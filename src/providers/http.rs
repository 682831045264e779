//! HTTP implementations of the collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    error::SourceError,
    traits::{AuthExchange, TelemetrySource},
};
use crate::{
    auth::{ApiRequest, AuthDispatcher},
    models::CredentialPair,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_credential: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_credential: String,
    refresh_credential: String,
}

/// Talks to the authentication collaborator over HTTP.
///
/// The refresh endpoint authenticates by request body, not bearer token, so
/// this type uses the plain retryable client rather than the dispatcher.
pub struct HttpAuthExchange {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
}

impl HttpAuthExchange {
    /// Creates an exchange client against the given API base URL.
    pub fn new(base_url: Url, client: Arc<ClientWithMiddleware>) -> Self {
        Self { base_url, client }
    }
}

#[async_trait]
impl AuthExchange for HttpAuthExchange {
    async fn refresh(&self, refresh_credential: &str) -> Result<CredentialPair, SourceError> {
        let url = self
            .base_url
            .join("/refresh")
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .json(&RefreshRequest { refresh_credential })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status { status: response.status().as_u16() });
        }
        let body: RefreshResponse =
            serde_json::from_slice(&response.bytes().await?)?;
        Ok(CredentialPair::new(body.access_credential, body.refresh_credential))
    }

    async fn validate(&self, access_credential: &str) -> Result<bool, SourceError> {
        let url = self
            .base_url
            .join("/me")
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        let response = self.client.get(url).bearer_auth(access_credential).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::UNAUTHORIZED => Ok(false),
            status => Err(SourceError::Status { status: status.as_u16() }),
        }
    }
}

/// Fetches history windows through the authenticated dispatcher, so every
/// telemetry call benefits from credential renewal and the single replay.
pub struct HttpTelemetrySource {
    dispatcher: Arc<AuthDispatcher>,
}

impl HttpTelemetrySource {
    /// Creates a telemetry source over the shared dispatcher.
    pub fn new(dispatcher: Arc<AuthDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetrySource {
    async fn history(
        &self,
        site_id: &str,
        window_hours: u32,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let request = ApiRequest::get(format!("/history/{site_id}"))
            .query("hours", window_hours.to_string());
        let response = self
            .dispatcher
            .dispatch(&request)
            .await
            .map_err(|e| SourceError::Auth(e.to_string()))?;

        // A hard 401-after-replay lands here too; the cache records it as
        // entry data rather than escalating.
        if !response.status().is_success() {
            return Err(SourceError::Status { status: response.status().as_u16() });
        }
        Ok(serde_json::from_slice(&response.bytes().await?)?)
    }
}
