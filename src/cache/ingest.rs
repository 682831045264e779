//! Canonicalization of raw history payloads into cache samples.

use crate::models::{RawSample, TelemetrySample};

/// Maps raw wire samples into canonical form: numeric coercion, reachability
/// derivation, malformed entries dropped individually, result sorted by
/// timestamp ascending.
pub(crate) fn ingest(raw: Vec<serde_json::Value>) -> Vec<TelemetrySample> {
    let mut samples: Vec<TelemetrySample> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawSample>(value) {
            Ok(sample) => Some(sample.canonicalize()),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed telemetry sample");
                None
            }
        })
        .collect();
    samples.sort_by_key(|sample| sample.timestamp);
    samples
}
