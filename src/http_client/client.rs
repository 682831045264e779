//! Construction of the HTTP client with transient-error retry middleware.
//!
//! Retries here cover network failures and rate limiting only. A 401 is a
//! final response from the middleware's point of view; the authenticated
//! dispatcher owns that case.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use thiserror::Error;

use crate::config::{HttpRetryConfig, JitterSetting};

/// Errors that can occur while building the HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The underlying `reqwest::Client` could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    BuildError(#[from] reqwest::Error),
}

/// Creates the retryable HTTP client shared by the auth and telemetry paths.
///
/// # Parameters:
/// - `config`: Configuration for retry policies
///
/// # Returns
/// A `ClientWithMiddleware` that includes retry capabilities
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
) -> Result<ClientWithMiddleware, HttpClientError> {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    let base_client = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    Ok(ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
