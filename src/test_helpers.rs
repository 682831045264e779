//! Builders and fixtures shared by unit and integration tests.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::models::{SiteSnapshot, SnmpMetrics};

/// Builds wire-format history samples for tests.
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    timestamp: DateTime<Utc>,
    latency: Option<f64>,
    packet_loss: Option<f64>,
    jitter: Option<f64>,
}

impl SampleBuilder {
    /// Starts a sample at the given RFC 3339 timestamp.
    ///
    /// # Panics
    /// Panics on an unparseable timestamp; acceptable in test code.
    pub fn at(timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.parse().expect("invalid RFC 3339 timestamp"),
            latency: None,
            packet_loss: None,
            jitter: None,
        }
    }

    /// Sets the latency field.
    pub fn latency(mut self, latency: f64) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sets the packet-loss field.
    pub fn packet_loss(mut self, packet_loss: f64) -> Self {
        self.packet_loss = Some(packet_loss);
        self
    }

    /// Sets the jitter field.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Renders the sample as the wire JSON the history endpoint serves.
    pub fn build(self) -> serde_json::Value {
        let mut value = json!({ "timestamp": self.timestamp.to_rfc3339() });
        if let Some(latency) = self.latency {
            value["latency"] = json!(latency);
        }
        if let Some(loss) = self.packet_loss {
            value["packetLoss"] = json!(loss);
        }
        if let Some(jitter) = self.jitter {
            value["jitter"] = json!(jitter);
        }
        value
    }
}

/// Builds a site snapshot with the given probe metrics, deriving
/// reachability the same way ingestion does.
pub fn snapshot_with(latency: Option<f64>, packet_loss: Option<f64>) -> SiteSnapshot {
    SiteSnapshot {
        latency,
        packet_loss,
        is_reachable: packet_loss.map(|loss| loss < 100.0),
        snmp: None,
        observed_at: Utc::now(),
    }
}

/// Builds a snapshot carrying SNMP device metrics.
pub fn snapshot_with_snmp(cpu: Option<f64>, memory: Option<f64>) -> SiteSnapshot {
    SiteSnapshot {
        latency: Some(10.0),
        packet_loss: Some(0.0),
        is_reachable: Some(true),
        snmp: Some(SnmpMetrics { cpu_usage: cpu, memory_usage: memory }),
        observed_at: Utc::now(),
    }
}
