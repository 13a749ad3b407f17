//! Batch generation with bounded concurrency and partial-failure isolation.

use std::sync::Arc;
use std::time::Duration;

use coverai_models::{GenerationRequest, GenerationResult};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::coordinator::FallbackCoordinator;

/// One processed batch entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub title: String,
    pub result: GenerationResult,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    /// Genuine provider successes
    pub succeeded: usize,
    /// Placeholder successes
    pub degraded: usize,
    /// Items where every provider failed
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

/// Applies the coordinator to many requests.
///
/// Concurrency is bounded by a worker semaphore; a small delay between item
/// spawns keeps a cold batch from bursting every provider's rate limit at
/// once. One item's total failure never aborts the others.
pub struct BatchRunner {
    coordinator: Arc<FallbackCoordinator>,
    max_concurrent: usize,
    item_delay: Duration,
}

impl BatchRunner {
    pub fn new(
        coordinator: Arc<FallbackCoordinator>,
        max_concurrent: usize,
        item_delay: Duration,
    ) -> Self {
        Self {
            coordinator,
            max_concurrent: max_concurrent.max(1),
            item_delay,
        }
    }

    /// Process every request, returning a report. Never fails: per-item
    /// outcomes live in the report.
    pub async fn run(&self, requests: Vec<GenerationRequest>) -> BatchReport {
        let total = requests.len();
        info!(total, "Starting cover batch");

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(total);

        for (index, request) in requests.into_iter().enumerate() {
            if index > 0 && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }

            let coordinator = Arc::clone(&self.coordinator);
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                // Coordinator owns the semaphores; acquisition cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                let title = request.title.clone();
                let result = coordinator.generate(&request).await;
                BatchItem { title, result }
            }));
        }

        let mut items = Vec::with_capacity(total);
        for handle in handles {
            match handle.await {
                Ok(item) => items.push(item),
                Err(e) => {
                    // A panicked item is isolated like any other failure
                    warn!("Batch task panicked: {e}");
                }
            }
        }

        let succeeded = items
            .iter()
            .filter(|i| i.result.success && !i.result.degraded)
            .count();
        let degraded = items.iter().filter(|i| i.result.degraded).count();
        let failed = items.iter().filter(|i| !i.result.success).count();

        info!(total, succeeded, degraded, failed, "Batch complete");
        BatchReport {
            total,
            succeeded,
            degraded,
            failed,
            items,
        }
    }
}
