//! This module provides the retryable HTTP client used for all outbound
//! dashboard API calls.

mod client;

pub use client::{create_retryable_http_client, HttpClientError};
