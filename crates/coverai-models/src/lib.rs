//! Shared data models for the CoverAI backend.
//!
//! This crate provides:
//! - Generation request and canonical dimension defaults
//! - Cover styles and network branding
//! - Job handle and status lifecycle
//! - Raw artifacts and finalized generation results
//! - Static provider descriptors

pub mod artifact;
pub mod descriptor;
pub mod job;
pub mod request;
pub mod result;
pub mod style;

pub use artifact::{ArtifactData, RawArtifact};
pub use descriptor::ProviderDescriptor;
pub use job::{JobHandle, JobStatus};
pub use request::GenerationRequest;
pub use result::{FailureKind, GenerationMetadata, GenerationResult, ProviderFailure};
pub use style::{BrandPalette, CoverStyle, Network, ParseStyleError};
