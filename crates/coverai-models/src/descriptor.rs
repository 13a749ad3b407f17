//! Static per-provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Static configuration for one provider in the fallback chain.
///
/// Built at process start and read-only afterwards. Priorities form a total
/// order; the coordinator attempts providers in strictly increasing priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider name
    pub name: String,
    /// Position in the fallback chain (lower runs first, must be unique)
    pub priority: u32,
    /// Maximum status calls per attempt
    pub max_attempts: u32,
    /// Sleep between status calls, milliseconds
    pub poll_interval_ms: u64,
    /// Timeout for a single HTTP call, milliseconds
    pub per_attempt_timeout_ms: u64,
    /// Environment variable holding the credential, if one is required
    pub requires_credential: Option<String>,
}

impl ProviderDescriptor {
    /// Create a descriptor with the given name and priority.
    pub fn new(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            priority,
            max_attempts: 30,
            poll_interval_ms: 2_000,
            per_attempt_timeout_ms: 30_000,
            requires_credential: None,
        }
    }

    /// Set the maximum number of status calls.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the interval between status calls.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the per-HTTP-call timeout.
    pub fn with_per_attempt_timeout_ms(mut self, ms: u64) -> Self {
        self.per_attempt_timeout_ms = ms;
        self
    }

    /// Require a credential in the named environment variable.
    pub fn with_credential(mut self, env_var: impl Into<String>) -> Self {
        self.requires_credential = Some(env_var.into());
        self
    }

    /// Interval between status calls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timeout for a single HTTP call.
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.per_attempt_timeout_ms)
    }

    /// Hard wall-clock ceiling for one full attempt against this provider.
    ///
    /// `max_attempts * poll_interval` plus one per-call timeout of slack, so
    /// a provider cannot exceed its budget even if individual calls return
    /// unusually fast or the final call stalls.
    pub fn budget_ceiling(&self) -> Duration {
        Duration::from_millis(
            (self.max_attempts as u64).saturating_mul(self.poll_interval_ms)
                + self.per_attempt_timeout_ms,
        )
    }
}
