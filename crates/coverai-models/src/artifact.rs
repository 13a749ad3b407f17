//! Raw generation artifacts, pre-normalization.

use serde::{Deserialize, Serialize};

/// Payload of a successful provider attempt.
#[derive(Clone, Serialize, Deserialize)]
pub enum ArtifactData {
    /// Image bytes returned inline (or decoded from an inline base64 payload)
    Bytes(Vec<u8>),
    /// Remote reference that still needs to be fetched
    Remote(String),
}

impl std::fmt::Debug for ArtifactData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactData::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            ArtifactData::Remote(url) => write!(f, "Remote({url})"),
        }
    }
}

/// Output of a successful provider attempt, before post-processing.
///
/// Reported dimensions are what the provider claims, not what the bytes
/// actually decode to; the post-processor re-inspects and enforces the
/// canonical size either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArtifact {
    pub data: ArtifactData,
    pub reported_width: Option<u32>,
    pub reported_height: Option<u32>,
}

impl RawArtifact {
    /// Artifact from inline bytes with unknown dimensions.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: ArtifactData::Bytes(bytes),
            reported_width: None,
            reported_height: None,
        }
    }

    /// Artifact referencing a remote URL.
    pub fn from_remote(url: impl Into<String>) -> Self {
        Self {
            data: ArtifactData::Remote(url.into()),
            reported_width: None,
            reported_height: None,
        }
    }

    /// Attach provider-reported dimensions.
    pub fn with_reported_dimensions(mut self, width: u32, height: u32) -> Self {
        self.reported_width = Some(width);
        self.reported_height = Some(height);
        self
    }
}
