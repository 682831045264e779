//! Application configuration loading and defaults.

use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, AlertThresholds,
    HttpRetryConfig,
};

/// Provides the default poll interval.
fn default_polling_interval() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default wait budget a caller spends on an in-flight
/// credential refresh before falling back to its current credential.
fn default_refresh_wait() -> Duration {
    Duration::from_secs(5)
}

/// Provides the default history window sizes fetched for each site.
fn default_window_hours() -> Vec<u32> {
    vec![1, 12, 24]
}

/// Provides the default path of the persisted preference file.
fn default_preferences_path() -> PathBuf {
    PathBuf::from("sitewatch-preferences.json")
}

/// Application configuration for the sitewatch client.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL of the dashboard API serving auth and telemetry endpoints.
    pub api_base_url: Url,

    /// Identifiers of the sites this client watches.
    pub sites: Vec<String>,

    /// History window sizes, in hours, fetched for each site.
    #[serde(default = "default_window_hours")]
    pub window_hours: Vec<u32>,

    /// The interval between telemetry refresh ticks. A persisted preference,
    /// when present, overrides this value at startup.
    #[serde(
        deserialize_with = "deserialize_duration_from_ms",
        default = "default_polling_interval"
    )]
    pub polling_interval_ms: Duration,

    /// How long a request path waits on an in-flight credential refresh
    /// before proceeding with its current credential.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_refresh_wait"
    )]
    pub refresh_wait_secs: Duration,

    /// Configuration for HTTP client retry policies.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Thresholds evaluated by the alert engine.
    #[serde(default)]
    pub thresholds: AlertThresholds,

    /// Path of the file holding persisted credentials and preferences.
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

impl AppConfig {
    /// Creates a new `AppConfig` from an optional TOML file plus `SITEWATCH_`
    /// environment overrides.
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        builder
            .add_source(Environment::with_prefix("SITEWATCH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
