//! Cover generation worker.
//!
//! This crate provides:
//! - [`FallbackCoordinator`]: sequential provider attempts with a failure
//!   ledger and guaranteed termination through the builtin placeholder
//! - [`BatchRunner`]: bounded-concurrency batch processing with per-item
//!   failure isolation
//! - Environment-driven configuration and the runnable binary

pub mod batch;
pub mod config;
pub mod coordinator;
pub mod error;

pub use batch::{BatchItem, BatchReport, BatchRunner};
pub use config::WorkerConfig;
pub use coordinator::FallbackCoordinator;
pub use error::{WorkerError, WorkerResult};
