//! Polling engine shared by the asynchronous provider adapters.
//!
//! Attempt counting and the wall-clock ceiling are tracked independently:
//! a provider that answers status calls unusually fast still cannot exceed
//! its time budget, and a provider that stalls mid-call is cut off by the
//! deadline even with attempts to spare.

use std::time::Duration;

use coverai_models::{JobStatus, ProviderDescriptor};
use tokio::time::Instant;

use crate::error::{ProviderError, ProviderResult};

/// Per-attempt budget: bounded status calls under a hard deadline.
#[derive(Debug)]
pub struct AttemptBudget {
    max_attempts: u32,
    poll_interval: Duration,
    deadline: Instant,
    attempts: u32,
}

impl AttemptBudget {
    /// Start a budget for one attempt against `descriptor`.
    pub fn start(descriptor: &ProviderDescriptor) -> Self {
        Self {
            max_attempts: descriptor.max_attempts,
            poll_interval: descriptor.poll_interval(),
            deadline: Instant::now() + descriptor.budget_ceiling(),
            attempts: 0,
        }
    }

    /// Number of status calls made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Account for one status call, failing once attempts or wall clock
    /// are exhausted.
    pub fn take_attempt(&mut self) -> ProviderResult<()> {
        if self.attempts >= self.max_attempts || Instant::now() >= self.deadline {
            return Err(ProviderError::Timeout {
                attempts: self.attempts,
            });
        }
        self.attempts += 1;
        Ok(())
    }

    /// Sleep one poll interval, clipped to the remaining budget.
    pub async fn wait(&self) {
        self.wait_for(self.poll_interval).await;
    }

    /// Sleep a custom cadence, clipped to the remaining budget.
    pub async fn wait_for(&self, interval: Duration) {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(interval.min(remaining)).await;
    }

    /// Timeout error carrying the attempts actually made.
    pub fn exhausted(&self) -> ProviderError {
        ProviderError::Timeout {
            attempts: self.attempts,
        }
    }
}

/// Phase of one polled attempt.
///
/// Explicit state machine so the "never loops forever" property is checkable
/// in isolation: `Terminal` absorbs every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Submitted, generation not yet started
    Pending,
    /// Provider reported generation in progress
    Started,
    /// Attempt finished (artifact, failure, or timeout)
    Terminal,
}

/// Event observed while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    /// Queue progress or heartbeat, no phase change beyond Pending
    Progress,
    /// Generation started
    Started,
    /// Artifact available
    Completed,
    /// Provider reported terminal failure
    Failed,
}

impl PollPhase {
    /// Transition table.
    pub fn advance(self, event: PollEvent) -> PollPhase {
        match (self, event) {
            (PollPhase::Terminal, _) => PollPhase::Terminal,
            (_, PollEvent::Completed) | (_, PollEvent::Failed) => PollPhase::Terminal,
            (_, PollEvent::Started) => PollPhase::Started,
            (phase, PollEvent::Progress) => phase,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollPhase::Terminal)
    }
}

/// Map a protocol-1 status string to a job status.
pub fn parse_job_status(raw: &str) -> ProviderResult<JobStatus> {
    match raw {
        "QUEUED" => Ok(JobStatus::Queued),
        "RUNNING" => Ok(JobStatus::Running),
        "COMPLETED" => Ok(JobStatus::Completed),
        "FAILED" => Ok(JobStatus::Failed),
        other => Err(ProviderError::decode(format!(
            "unrecognized job status: {other}"
        ))),
    }
}
