//! Provider error taxonomy.

use coverai_models::FailureKind;
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors a provider attempt can terminate with.
///
/// Only `Network` is retried in place (bounded, with backoff); every other
/// kind advances the coordinator to the next provider in the chain.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider rejected submission: {0}")]
    Rejected(String),

    #[error("Provider reported job failure: {0}")]
    JobFailed(String),

    #[error("Timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Check if this error may be retried within the same attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network(_))
    }

    /// Classification recorded in the per-request failure ledger.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::Config(_) => FailureKind::Config,
            ProviderError::Network(_) => FailureKind::TransientNetwork,
            ProviderError::Rejected(_) => FailureKind::Rejected,
            ProviderError::JobFailed(_) => FailureKind::JobFailed,
            ProviderError::Timeout { .. } => FailureKind::Timeout,
            ProviderError::Decode(_) => FailureKind::Decode,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // A stalled single call is a transport fault, not budget exhaustion
            ProviderError::Network(format!("request timed out: {e}"))
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_is_transient() {
        assert!(ProviderError::network("reset").is_transient());
        assert!(!ProviderError::config("no key").is_transient());
        assert!(!ProviderError::job_failed("nsfw filter").is_transient());
        assert!(!ProviderError::Timeout { attempts: 30 }.is_transient());
        assert!(!ProviderError::decode("bad json").is_transient());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ProviderError::config("x").kind(), FailureKind::Config);
        assert_eq!(
            ProviderError::Timeout { attempts: 5 }.kind(),
            FailureKind::Timeout
        );
    }
}
