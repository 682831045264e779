//! The alert lifecycle engine.

pub mod alert_engine;

pub use alert_engine::{AlertEngine, TickOutcome};
