//! Session state, single-flight credential refresh, and the authenticated
//! request dispatcher.
//!
//! These three pieces share one job: letting many overlapping request paths
//! use a single network-backed session without ever issuing redundant
//! refresh exchanges. The session store is pure state; the coordinator owns
//! the one mutation path for credentials; the dispatcher is the only outward
//! surface request code needs.

pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod session;

pub use coordinator::RefreshCoordinator;
pub use dispatcher::{ApiRequest, AuthDispatcher};
pub use error::AuthError;
pub use session::SessionStore;
