//! The per-key, staleness-gated telemetry window cache.

mod ingest;
mod manager;

pub use manager::TelemetryCache;
