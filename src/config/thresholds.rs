//! Fixed alert thresholds evaluated by the alert engine.

use serde::Deserialize;

fn default_latency_ms() -> f64 {
    150.0
}

fn default_packet_loss_pct() -> f64 {
    20.0
}

fn default_cpu_pct() -> f64 {
    90.0
}

fn default_memory_pct() -> f64 {
    90.0
}

/// Threshold values above which the alert engine raises a condition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertThresholds {
    /// Latency in milliseconds above which a `latency` warning is raised.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: f64,
    /// Packet loss percentage above which a `packetloss` warning is raised.
    #[serde(default = "default_packet_loss_pct")]
    pub packet_loss_pct: f64,
    /// CPU usage percentage above which a `cpu` warning is raised.
    #[serde(default = "default_cpu_pct")]
    pub cpu_pct: f64,
    /// Memory usage percentage above which a `memory` warning is raised.
    #[serde(default = "default_memory_pct")]
    pub memory_pct: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            packet_loss_pct: default_packet_loss_pct(),
            cpu_pct: default_cpu_pct(),
            memory_pct: default_memory_pct(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_config() {
        let parsed: AlertThresholds = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AlertThresholds::default());
        assert_eq!(parsed.latency_ms, 150.0);
        assert_eq!(parsed.packet_loss_pct, 20.0);
    }
}
