//! Fallback coordination across the provider chain.

use std::collections::HashMap;
use std::sync::Arc;

use coverai_media::{FinalizedCover, MediaError, PostProcessor};
use coverai_models::{FailureKind, GenerationRequest, GenerationResult, ProviderFailure};
use coverai_providers::CoverProvider;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Drives the provider chain for one request at a time.
///
/// Providers are attempted strictly in priority order, never raced: the
/// ordering is a designed fallback priority and providers may bill per call.
/// Every failure is classified and recorded; the chain's builtin placeholder
/// guarantees the loop terminates with a result.
pub struct FallbackCoordinator {
    providers: Vec<Arc<dyn CoverProvider>>,
    limits: HashMap<String, Arc<Semaphore>>,
    post: Arc<PostProcessor>,
}

impl FallbackCoordinator {
    /// Create a coordinator over `providers`, sorted by priority.
    ///
    /// `per_provider_inflight` bounds concurrent jobs against each provider
    /// across all requests, since providers enforce their own rate limits.
    pub fn new(
        mut providers: Vec<Arc<dyn CoverProvider>>,
        post: Arc<PostProcessor>,
        per_provider_inflight: usize,
    ) -> Self {
        providers.sort_by_key(|p| p.descriptor().priority);
        let limits = providers
            .iter()
            .map(|p| {
                (
                    p.name().to_string(),
                    Arc::new(Semaphore::new(per_provider_inflight.max(1))),
                )
            })
            .collect();
        Self {
            providers,
            limits,
            post,
        }
    }

    /// Providers in attempt order.
    pub fn providers(&self) -> &[Arc<dyn CoverProvider>] {
        &self.providers
    }

    /// Produce exactly one result for the request.
    ///
    /// Never returns an error: exhaustion of the whole chain yields a
    /// populated failure result carrying the per-provider ledger.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let started = Instant::now();
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for provider in &self.providers {
            let name = provider.name().to_string();
            debug!(provider = %name, title = %request.title, "Attempting provider");

            match self.attempt(provider.as_ref(), &name, request).await {
                Ok(cover) => {
                    let degraded = provider.is_placeholder();
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    info!(
                        provider = %name,
                        degraded,
                        elapsed_ms,
                        url = %cover.url,
                        "Cover generated"
                    );
                    return GenerationResult::success(
                        name,
                        cover.url,
                        cover.path,
                        degraded,
                        elapsed_ms,
                        failures,
                    );
                }
                Err(failure) => {
                    warn!(
                        provider = %name,
                        kind = %failure.kind,
                        "Provider failed, advancing: {}",
                        failure.message
                    );
                    failures.push(failure);
                }
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        warn!(
            title = %request.title,
            attempts = failures.len(),
            "All providers exhausted"
        );
        GenerationResult::exhausted(elapsed_ms, failures)
    }

    /// One full attempt against one provider: submit, await under the
    /// provider's budget ceiling, post-process.
    async fn attempt(
        &self,
        provider: &dyn CoverProvider,
        name: &str,
        request: &GenerationRequest,
    ) -> Result<FinalizedCover, ProviderFailure> {
        // Bound in-flight jobs per provider; closed semaphores cannot occur
        // since the coordinator owns them.
        let _permit = match self.limits.get(name) {
            Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
            None => None,
        };

        let handle = provider
            .submit(request)
            .await
            .map_err(|e| ProviderFailure::new(name, e.kind(), e.to_string()))?;

        let ceiling = provider.descriptor().budget_ceiling();
        let artifact = match tokio::time::timeout(
            ceiling,
            provider.await_result(&handle, request),
        )
        .await
        {
            Ok(Ok(artifact)) => artifact,
            Ok(Err(e)) => return Err(ProviderFailure::new(name, e.kind(), e.to_string())),
            // Outer guard: even a misbehaving adapter cannot overrun its budget
            Err(_) => {
                return Err(ProviderFailure::new(
                    name,
                    FailureKind::Timeout,
                    format!("budget ceiling of {ceiling:?} exceeded"),
                ))
            }
        };

        self.post
            .finalize(request, artifact, name)
            .await
            .map_err(|e| ProviderFailure::new(name, media_failure_kind(&e), e.to_string()))
    }
}

/// Classify a post-processing failure for the ledger.
fn media_failure_kind(error: &MediaError) -> FailureKind {
    match error {
        MediaError::FetchFailed(_) => FailureKind::TransientNetwork,
        _ => FailureKind::Decode,
    }
}
