#![warn(missing_docs)]
//! Sitewatch is the client-side synchronization core of a network-site
//! telemetry dashboard: it keeps an authenticated session alive across many
//! concurrent in-flight requests without redundant refreshes, maintains a
//! per-key staleness-gated cache of historical telemetry windows with at most
//! one outstanding fetch per key, and derives a deduplicated alert lifecycle
//! from repeatedly-recomputed snapshots.

pub mod auth;
pub mod cache;
pub mod config;
pub mod engine;
pub mod http_client;
pub mod models;
pub mod persistence;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
