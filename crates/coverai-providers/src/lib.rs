//! Generation provider adapters for the CoverAI backend.
//!
//! This crate provides:
//! - The [`CoverProvider`] trait the coordinator drives
//! - Adapters for the three wire protocols plus the builtin placeholder
//! - The attempt budget / polling state machine
//! - The provider error taxonomy and bounded transient-fault backoff

pub mod adapter;
pub mod backoff;
pub mod builtin;
pub mod error;
pub mod inference;
pub mod poll;
pub mod pollinations;
pub mod prompt;
pub mod spaces;

pub use adapter::CoverProvider;
pub use backoff::{retry_transient, BackoffPolicy};
pub use builtin::BuiltinProvider;
pub use error::{ProviderError, ProviderResult};
pub use inference::InferenceProvider;
pub use poll::{parse_job_status, AttemptBudget, PollEvent, PollPhase};
pub use pollinations::UrlImageProvider;
pub use spaces::SpacesProvider;
