//! Trait seams to the external collaborators: the authentication exchange
//! and the telemetry history endpoint, plus their HTTP implementations.

pub mod error;
pub mod http;
pub mod traits;

pub use error::SourceError;
pub use http::{HttpAuthExchange, HttpTelemetrySource};
pub use traits::{AuthExchange, TelemetrySource};
