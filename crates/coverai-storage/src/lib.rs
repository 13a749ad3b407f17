//! Durable local storage for finalized covers.
//!
//! Final artifacts are written under a storage root keyed by a generated
//! identifier; the root is created if absent. No other persisted state
//! belongs to this subsystem.

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{LocalStore, StoreConfig, StoredCover};
