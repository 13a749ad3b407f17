//! The provider adapter trait.

use async_trait::async_trait;
use coverai_models::{GenerationRequest, JobHandle, ProviderDescriptor, RawArtifact};

use crate::error::{ProviderError, ProviderResult};

/// One external generation backend with its own submission/polling protocol.
///
/// The coordinator is protocol-agnostic: it drives adapters purely through
/// this trait, in priority order, one at a time per request.
#[async_trait]
pub trait CoverProvider: Send + Sync {
    /// Static configuration for this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Provider name (unique within a chain).
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Submit a generation job.
    ///
    /// Must fail fast with [`ProviderError::Config`] before any network call
    /// when a required credential is absent, so a misconfigured provider
    /// costs none of the request's time budget.
    async fn submit(&self, request: &GenerationRequest) -> ProviderResult<JobHandle>;

    /// Wait for the submitted job to finish within this provider's budget.
    async fn await_result(
        &self,
        handle: &JobHandle,
        request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact>;

    /// True for the zero-dependency placeholder; its successes are reported
    /// as degraded.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Read a required credential from the environment, short-circuiting with a
/// config error when missing. Called at the top of `submit`.
pub(crate) fn require_credential(descriptor: &ProviderDescriptor) -> ProviderResult<Option<String>> {
    match &descriptor.requires_credential {
        Some(var) => match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok(Some(value)),
            _ => Err(ProviderError::config(format!("{var} not set"))),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_config_error() {
        let descriptor =
            ProviderDescriptor::new("inference", 1).with_credential("COVERAI_TEST_MISSING_KEY");
        let err = require_credential(&descriptor).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn test_no_credential_needed() {
        let descriptor = ProviderDescriptor::new("pollinations", 3);
        assert!(require_credential(&descriptor).unwrap().is_none());
    }
}
