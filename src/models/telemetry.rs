//! Telemetry window, cache, and snapshot data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The fixed set of history window sizes the telemetry collaborator serves.
pub const SUPPORTED_WINDOW_HOURS: [u32; 5] = [1, 6, 12, 24, 72];

/// An error raised when a cache key is built with a window size outside
/// [`SUPPORTED_WINDOW_HOURS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported history window: {0} hours")]
pub struct UnsupportedWindow(pub u32);

/// Identifies one cached telemetry window: a site paired with a window size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    site_id: String,
    window_hours: u32,
}

impl CacheKey {
    /// Creates a cache key, validating the window size against the supported
    /// set.
    pub fn new(site_id: impl Into<String>, window_hours: u32) -> Result<Self, UnsupportedWindow> {
        if !SUPPORTED_WINDOW_HOURS.contains(&window_hours) {
            return Err(UnsupportedWindow(window_hours));
        }
        Ok(Self { site_id: site_id.into(), window_hours })
    }

    /// The site this key addresses.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// The history window size in hours.
    pub fn window_hours(&self) -> u32 {
        self.window_hours
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}h", self.site_id, self.window_hours)
    }
}

/// One historical telemetry sample in canonical form.
///
/// `is_reachable` is derived at ingestion from `packet_loss` (`packet_loss <
/// 100`) and is `None` when packet loss was not reported, so downstream
/// consumers never re-derive it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Round-trip latency in milliseconds, if measured.
    pub latency: Option<f64>,
    /// Packet loss percentage (0-100), if measured.
    pub packet_loss: Option<f64>,
    /// Latency jitter in milliseconds, if measured.
    pub jitter: Option<f64>,
    /// Whether the site answered at all, derived from `packet_loss`.
    pub is_reachable: Option<bool>,
}

/// A telemetry sample as it arrives on the wire, before canonicalization.
///
/// Numeric fields tolerate numbers, numeric strings, or null; a sample whose
/// timestamp is missing or unparseable is malformed and dropped during
/// ingestion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSample {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Round-trip latency in milliseconds.
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub latency: Option<f64>,
    /// Packet loss percentage.
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub packet_loss: Option<f64>,
    /// Latency jitter in milliseconds.
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub jitter: Option<f64>,
}

impl RawSample {
    /// Converts the wire form into the canonical sample shape, deriving
    /// reachability from packet loss.
    pub fn canonicalize(self) -> TelemetrySample {
        TelemetrySample {
            timestamp: self.timestamp,
            latency: self.latency,
            packet_loss: self.packet_loss,
            jitter: self.jitter,
            is_reachable: self.packet_loss.map(|loss| loss < 100.0),
        }
    }
}

/// Accepts a number, a numeric string, or null for optional metric fields.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Text(String),
        Null(Option<()>),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => Ok(Some(n)),
        Lenient::Text(s) => {
            s.trim().parse::<f64>().map(Some).map_err(serde::de::Error::custom)
        }
        Lenient::Null(_) => Ok(None),
    }
}

/// One cached telemetry window.
///
/// Entries are replaced wholesale on every fetch; a failed fetch produces an
/// entry with empty samples and a populated `error` so "is this data usable"
/// and "should we fetch again soon" stay independent questions.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Samples ordered by timestamp ascending.
    pub samples: Vec<TelemetrySample>,
    /// When this window was last fetched, successfully or not.
    pub fetched_at: DateTime<Utc>,
    /// The failure message from the most recent fetch, if it failed.
    pub error: Option<String>,
}

impl CacheEntry {
    /// Returns `true` when the most recent fetch for this window failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Coarse site availability as observed on the most recent tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// The site answered its most recent probe.
    Online,
    /// The site did not answer its most recent probe.
    Offline,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Online => write!(f, "online"),
            SiteStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Optional device metrics reported over SNMP alongside probe telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnmpMetrics {
    /// CPU utilization percentage.
    pub cpu_usage: Option<f64>,
    /// Memory utilization percentage.
    pub memory_usage: Option<f64>,
}

/// The latest merged observation for one site, fed to the alert engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSnapshot {
    /// Round-trip latency in milliseconds.
    pub latency: Option<f64>,
    /// Packet loss percentage.
    pub packet_loss: Option<f64>,
    /// Whether the site is currently reachable.
    pub is_reachable: Option<bool>,
    /// SNMP device metrics, when the site reports them.
    pub snmp: Option<SnmpMetrics>,
    /// When the underlying observation was taken.
    pub observed_at: DateTime<Utc>,
}

impl SiteSnapshot {
    /// Builds a snapshot from the newest sample of a cached window.
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self {
            latency: sample.latency,
            packet_loss: sample.packet_loss,
            is_reachable: sample.is_reachable,
            snmp: None,
            observed_at: sample.timestamp,
        }
    }

    /// The coarse status this snapshot implies: offline only when the site is
    /// known unreachable.
    pub fn status(&self) -> SiteStatus {
        match self.is_reachable {
            Some(false) => SiteStatus::Offline,
            _ => SiteStatus::Online,
        }
    }
}
