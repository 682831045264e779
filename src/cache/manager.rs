//! The telemetry cache manager: staleness gating and per-key single-flight
//! fetches.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use dashmap::DashMap;

use super::ingest::ingest;
use crate::{
    models::{CacheEntry, CacheKey},
    providers::TelemetrySource,
};

/// The floor on the staleness window, independent of the poll interval.
const MIN_STALENESS: Duration = Duration::from_secs(5);

/// A keyed store of time-windowed historical telemetry.
///
/// Entries are stamped with their fetch time and replaced wholesale on every
/// fetch. A per-key in-flight marker suppresses duplicate fetches for the
/// same key while legitimately allowing different keys to fetch
/// concurrently. The map is grow-only for the session's lifetime.
pub struct TelemetryCache {
    source: Arc<dyn TelemetrySource>,
    entries: DashMap<CacheKey, CacheEntry>,
    // Present iff a fetch for that exact key is outstanding.
    in_flight: DashMap<CacheKey, ()>,
    poll_interval: Duration,
}

impl TelemetryCache {
    /// Creates a cache over the given telemetry source. `poll_interval`
    /// participates in the staleness rule.
    pub fn new(source: Arc<dyn TelemetrySource>, poll_interval: Duration) -> Self {
        Self { source, entries: DashMap::new(), in_flight: DashMap::new(), poll_interval }
    }

    /// Returns a copy of the cached entry for a key, if one exists.
    pub fn get_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Whether the entry for a key needs refreshing: absent, or older than
    /// `max(5s, poll_interval)`.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        let window = self.poll_interval.max(MIN_STALENESS);
        match self.entries.get(key) {
            Some(entry) => {
                let age = Utc::now().signed_duration_since(entry.fetched_at);
                age.to_std().map_or(true, |age| age > window)
            }
            None => true,
        }
    }

    /// Fire-and-forget refresh: spawns a fetch for the key unless the entry
    /// is still fresh (`force` overrides) or a fetch for that exact key is
    /// already outstanding. The result is observable through the entry.
    pub fn ensure_fresh(self: &Arc<Self>, key: &CacheKey, force: bool) {
        if !force && !self.is_stale(key) {
            return;
        }
        // The marker must be claimed before any await so that overlapping
        // callers for the same key see it and back off.
        if self.in_flight.insert(key.clone(), ()).is_some() {
            return;
        }
        let cache = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            cache.run_fetch(&key).await;
        });
    }

    /// Performs the network round trip and ingestion for a key now,
    /// returning once the entry has been replaced. A no-op if a fetch for
    /// the key is already outstanding.
    pub async fn fetch_now(&self, key: &CacheKey) {
        if self.in_flight.insert(key.clone(), ()).is_some() {
            return;
        }
        self.run_fetch(key).await;
    }

    /// Owns the key's in-flight slot: fetch, ingest, replace the entry
    /// wholesale, and clear the marker on every path. A failed fetch still
    /// stamps `fetched_at` so a failing endpoint is not hammered every tick.
    async fn run_fetch(&self, key: &CacheKey) {
        let entry = match self.source.history(key.site_id(), key.window_hours()).await {
            Ok(raw) => {
                let samples = ingest(raw);
                tracing::debug!(key = %key, samples = samples.len(), "Telemetry window updated");
                CacheEntry { samples, fetched_at: Utc::now(), error: None }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Telemetry window fetch failed");
                CacheEntry { samples: Vec::new(), fetched_at: Utc::now(), error: Some(e.to_string()) }
            }
        };
        self.entries.insert(key.clone(), entry);
        // Must run on both outcomes; a leaked marker would starve the key
        // for the rest of the session.
        self.in_flight.remove(key);
    }
}
