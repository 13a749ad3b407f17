//! Job handle and status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle to one outstanding generation attempt against a single provider.
///
/// Owned exclusively by the in-flight attempt that created it and discarded
/// when that attempt terminates. Never shared across providers or requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    /// Provider the job was submitted to
    pub provider: String,
    /// Provider-assigned identifier (job id, event id, or encoded URL)
    pub external_id: String,
    /// When the submission call returned
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    /// Create a handle for a freshly submitted job.
    pub fn new(provider: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            external_id: external_id.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Status of a generation job within one attempt.
///
/// Monotonic: once a terminal state is reached no further transitions occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the provider, waiting for a slot
    #[default]
    Queued,
    /// Actively generating
    Running,
    /// Finished with an artifact
    Completed,
    /// Provider reported terminal failure
    Failed,
    /// Budget ceiling exceeded before completion
    TimedOut,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::TimedOut => "timed_out",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::TimedOut.is_terminal());
    }

    #[test]
    fn test_handle_records_provider() {
        let handle = JobHandle::new("spaces", "ev-123");
        assert_eq!(handle.provider, "spaces");
        assert_eq!(handle.external_id, "ev-123");
    }
}
