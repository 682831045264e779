//! This module contains the data models for the sitewatch synchronization core.

pub mod alert;
pub mod session;
pub mod telemetry;

pub use alert::{Alert, AlertCondition, AlertSeverity, NotificationEvent};
pub use session::{CredentialPair, Session};
pub use telemetry::{
    CacheEntry, CacheKey, RawSample, SiteSnapshot, SiteStatus, SnmpMetrics, TelemetrySample,
    UnsupportedWindow, SUPPORTED_WINDOW_HOURS,
};
