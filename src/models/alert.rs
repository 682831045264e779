//! Alert and notification data types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::telemetry::SiteStatus;

/// How severe an alert condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// The site is effectively unusable.
    Critical,
    /// The site is degraded but still serving.
    Warning,
}

/// The fixed threshold conditions the alert engine evaluates, in evaluation
/// order. Conditions are independent; one site can carry several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertCondition {
    /// The site is unreachable.
    Down,
    /// Latency is above the configured threshold.
    Latency,
    /// Packet loss is above the configured threshold.
    PacketLoss,
    /// SNMP-reported CPU usage is above the configured threshold.
    Cpu,
    /// SNMP-reported memory usage is above the configured threshold.
    Memory,
}

impl AlertCondition {
    /// The stable name used in alert identities.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Down => "down",
            AlertCondition::Latency => "latency",
            AlertCondition::PacketLoss => "packetloss",
            AlertCondition::Cpu => "cpu",
            AlertCondition::Memory => "memory",
        }
    }

    /// The severity this condition carries.
    pub fn severity(&self) -> AlertSeverity {
        match self {
            AlertCondition::Down => AlertSeverity::Critical,
            _ => AlertSeverity::Warning,
        }
    }
}

/// One active alert condition on one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Deterministic identity derived from the site and condition, never from
    /// a timestamp, so repeated occurrences of the same condition collapse to
    /// the same id across ticks.
    pub id: String,
    /// How severe the condition is.
    pub severity: AlertSeverity,
    /// Human-readable description of the condition.
    pub message: String,
    /// The site carrying the condition.
    pub site_id: String,
    /// When the condition was most recently detected.
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Derives the stable identity for a condition on a site.
    pub fn id_for(site_id: &str, condition: AlertCondition) -> String {
        format!("{}-{}", site_id, condition.as_str())
    }
}

/// A side effect the alert engine asks its caller to surface to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// An alert id appeared that has not been surfaced this episode.
    NewAlert(Alert),
    /// A site changed coarse status. Emitted on every transition, independent
    /// of alert acknowledgement.
    StatusChange {
        /// The site that transitioned.
        site_id: String,
        /// The status observed on the previous tick.
        previous: SiteStatus,
        /// The status observed on this tick.
        current: SiteStatus,
    },
}
