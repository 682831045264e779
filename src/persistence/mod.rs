//! Persisted local state: the credential pair and the poll-interval
//! preference, behind a simple get/set key-value contract.

pub mod error;
pub mod file;
pub mod traits;

pub use error::PersistenceError;
pub use file::FilePreferenceStore;
pub use traits::PreferenceStore;
