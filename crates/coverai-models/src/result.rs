//! Terminal generation results returned to callers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of why a provider was skipped or failed.
///
/// Mirrors the provider error taxonomy in a serializable form so failure
/// ledgers can be logged and persisted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing credential, skipped before any network call
    Config,
    /// Transient transport fault that outlasted its bounded retries
    TransientNetwork,
    /// Provider rejected the submission outright
    Rejected,
    /// Provider reported terminal job failure
    JobFailed,
    /// Budget ceiling exceeded
    Timeout,
    /// Malformed or unexpected result payload
    Decode,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Config => "config",
            FailureKind::TransientNetwork => "transient_network",
            FailureKind::Rejected => "rejected",
            FailureKind::JobFailed => "job_failed",
            FailureKind::Timeout => "timeout",
            FailureKind::Decode => "decode",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded provider failure within a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(
        provider: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }
}

/// How a result was produced and how long it took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Generation method (provider name, or "builtin_fallback")
    pub method: String,
    /// Wall time from request start to finalized artifact
    pub generation_time_ms: u64,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
}

/// Terminal value returned to the caller, exactly one per request.
///
/// Either a genuine success, a degraded success from the built-in
/// placeholder, or a structured failure enumerating why each provider was
/// skipped. Never an unhandled error crossing the orchestrator boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Provider that produced the artifact, if any
    pub provider_used: Option<String>,
    /// Stable public locator of the stored cover
    pub artifact_url: Option<String>,
    /// Local path of the stored cover
    pub local_path: Option<PathBuf>,
    /// True when the placeholder produced the artifact
    pub degraded: bool,
    pub metadata: GenerationMetadata,
    /// One entry per skipped or failed provider, in attempt order
    pub errors_by_provider: Vec<ProviderFailure>,
}

impl GenerationResult {
    /// Build a successful result.
    pub fn success(
        provider: impl Into<String>,
        artifact_url: impl Into<String>,
        local_path: PathBuf,
        degraded: bool,
        generation_time_ms: u64,
        errors_by_provider: Vec<ProviderFailure>,
    ) -> Self {
        let provider = provider.into();
        Self {
            success: true,
            provider_used: Some(provider.clone()),
            artifact_url: Some(artifact_url.into()),
            local_path: Some(local_path),
            degraded,
            metadata: GenerationMetadata {
                method: if degraded {
                    "builtin_fallback".to_string()
                } else {
                    provider
                },
                generation_time_ms,
                timestamp: Utc::now(),
            },
            errors_by_provider,
        }
    }

    /// Build a failure result carrying the full per-provider error ledger.
    pub fn exhausted(
        generation_time_ms: u64,
        errors_by_provider: Vec<ProviderFailure>,
    ) -> Self {
        Self {
            success: false,
            provider_used: None,
            artifact_url: None,
            local_path: None,
            degraded: false,
            metadata: GenerationMetadata {
                method: "none".to_string(),
                generation_time_ms,
                timestamp: Utc::now(),
            },
            errors_by_provider,
        }
    }
}
