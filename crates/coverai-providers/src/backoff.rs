//! Bounded exponential backoff for transport-level retries.
//!
//! Used when a poll read fails at the transport layer (connection reset,
//! aborted stream). Terminal provider errors are never routed through here.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::ProviderResult;

/// Backoff configuration for transient-fault retries.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay, doubled each retry.
    pub base_delay: Duration,
    /// Cap on the delay between retries.
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    /// Delay before the given retry (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)));
        doubled.min(self.max_delay)
    }
}

/// Run `operation`, retrying transient failures per `policy`.
///
/// Non-transient errors are returned immediately. When retries are
/// exhausted the last transient error is returned as-is.
pub async fn retry_transient<F, Fut, T>(
    policy: &BackoffPolicy,
    operation_name: &str,
    operation: F,
) -> ProviderResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut retry = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for_retry(retry);
                debug!(
                    "{} transient failure (retry {}/{}), backing off {:?}: {}",
                    operation_name, retry, policy.max_retries, delay, e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
