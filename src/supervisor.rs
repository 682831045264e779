//! The poll supervisor: drives the telemetry cache and alert engine once per
//! tick and surfaces notification events through the log.

use std::{collections::HashMap, sync::Arc, time::Duration};

use thiserror::Error;
use tokio::signal;

use crate::{
    cache::TelemetryCache,
    engine::AlertEngine,
    models::{
        AlertSeverity, CacheKey, NotificationEvent, SiteSnapshot, UnsupportedWindow,
    },
};

/// Errors that can occur while building or running the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// No sites were configured; there is nothing to watch.
    #[error("No sites configured")]
    NoSites,

    /// A configured history window size is not served by the collaborator.
    #[error(transparent)]
    UnsupportedWindow(#[from] UnsupportedWindow),
}

/// Owns the per-tick control flow of the client.
///
/// Each tick refreshes every configured (site, window) cache key, derives the
/// latest snapshot per site from the freshest cached samples, and runs the
/// alert engine over them. The push channel that live deployments merge into
/// snapshots belongs to the UI layer; this supervisor derives snapshots from
/// history alone.
pub struct Supervisor {
    cache: Arc<TelemetryCache>,
    engine: AlertEngine,
    sites: Vec<String>,
    keys: Vec<CacheKey>,
    poll_interval: Duration,
}

impl Supervisor {
    /// Creates a supervisor for the given sites and window sizes, validating
    /// every window up front.
    pub fn new(
        cache: Arc<TelemetryCache>,
        engine: AlertEngine,
        sites: Vec<String>,
        window_hours: &[u32],
        poll_interval: Duration,
    ) -> Result<Self, SupervisorError> {
        if sites.is_empty() {
            return Err(SupervisorError::NoSites);
        }
        let mut keys = Vec::with_capacity(sites.len() * window_hours.len());
        for site in &sites {
            for &hours in window_hours {
                keys.push(CacheKey::new(site.clone(), hours)?);
            }
        }
        Ok(Self { cache, engine, sites, keys, poll_interval })
    }

    /// Runs the tick loop until a shutdown signal arrives.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        tracing::info!(
            sites = self.sites.len(),
            keys = self.keys.len(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Supervisor started"
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                _ = signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One tick: kick off refreshes, then recompute alerts from whatever is
    /// cached right now. Fetches complete in the background and feed the
    /// next tick.
    fn tick(&mut self) {
        for key in &self.keys {
            self.cache.ensure_fresh(key, false);
        }

        let snapshots = self.latest_snapshots();
        let outcome = self.engine.recompute(&self.sites, &snapshots);
        for event in outcome.events {
            log_event(&event);
        }
    }

    /// Derives the newest observation per site across its cached windows.
    fn latest_snapshots(&self) -> HashMap<String, SiteSnapshot> {
        let mut snapshots: HashMap<String, SiteSnapshot> = HashMap::new();
        for key in &self.keys {
            let Some(entry) = self.cache.get_entry(key) else { continue };
            // Samples are ordered ascending, so the last one is newest.
            let Some(sample) = entry.samples.last() else { continue };
            let candidate = SiteSnapshot::from_sample(sample);
            match snapshots.get(key.site_id()) {
                Some(existing) if existing.observed_at >= candidate.observed_at => {}
                _ => {
                    snapshots.insert(key.site_id().to_string(), candidate);
                }
            }
        }
        snapshots
    }
}

fn log_event(event: &NotificationEvent) {
    match event {
        NotificationEvent::NewAlert(alert) => match alert.severity {
            AlertSeverity::Critical => {
                tracing::error!(id = %alert.id, site = %alert.site_id, "{}", alert.message)
            }
            AlertSeverity::Warning => {
                tracing::warn!(id = %alert.id, site = %alert.site_id, "{}", alert.message)
            }
        },
        NotificationEvent::StatusChange { site_id, previous, current } => {
            tracing::info!(site = %site_id, %previous, %current, "Site status changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        config::AlertThresholds,
        providers::{SourceError, TelemetrySource},
    };

    struct StaticSource;

    #[async_trait]
    impl TelemetrySource for StaticSource {
        async fn history(
            &self,
            _site_id: &str,
            window_hours: u32,
        ) -> Result<Vec<serde_json::Value>, SourceError> {
            // The smaller window carries the newer sample.
            let timestamp = if window_hours == 1 {
                "2026-08-29T10:30:00Z"
            } else {
                "2026-08-29T10:00:00Z"
            };
            Ok(vec![json!({ "timestamp": timestamp, "packetLoss": 60, "latency": 10.0 })])
        }
    }

    fn supervisor(sites: Vec<String>, windows: &[u32]) -> Result<Supervisor, SupervisorError> {
        let cache = Arc::new(TelemetryCache::new(Arc::new(StaticSource), Duration::from_secs(60)));
        Supervisor::new(
            cache,
            AlertEngine::new(AlertThresholds::default()),
            sites,
            windows,
            Duration::from_secs(60),
        )
    }

    #[test]
    fn rejects_empty_site_list() {
        assert!(matches!(supervisor(vec![], &[1]), Err(SupervisorError::NoSites)));
    }

    #[test]
    fn rejects_unsupported_windows_up_front() {
        assert!(matches!(
            supervisor(vec!["s1".to_string()], &[1, 13]),
            Err(SupervisorError::UnsupportedWindow(UnsupportedWindow(13)))
        ));
    }

    #[tokio::test]
    async fn latest_snapshot_prefers_newest_sample_across_windows() {
        let sup = supervisor(vec!["s1".to_string()], &[1, 24]).unwrap();
        for key in &sup.keys {
            sup.cache.fetch_now(key).await;
        }
        let snapshots = sup.latest_snapshots();
        let snapshot = snapshots.get("s1").unwrap();
        assert_eq!(
            snapshot.observed_at,
            "2026-08-29T10:30:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
        );
        assert_eq!(snapshot.packet_loss, Some(60.0));
    }

    #[tokio::test]
    async fn tick_recomputes_alerts_from_cached_samples() {
        let mut sup = supervisor(vec!["s1".to_string()], &[1]).unwrap();
        for key in sup.keys.clone() {
            sup.cache.fetch_now(&key).await;
        }
        sup.tick();
        // The engine saw the lossy snapshot; a second tick shows the alert
        // persisting without a fresh notification.
        let snapshots = sup.latest_snapshots();
        let outcome = sup.engine.recompute(&sup.sites, &snapshots);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].id, "s1-packetloss");
        assert!(outcome.events.is_empty());
    }
}
