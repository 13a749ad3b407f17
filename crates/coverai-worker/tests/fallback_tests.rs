//! Fallback chain scenarios with scripted providers.
//!
//! These run under a paused tokio clock: poll-interval sleeps auto-advance,
//! so elapsed-time assertions are exact rather than wall-clock dependent.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coverai_media::{NoopWatermarker, PostProcessor};
use coverai_models::{
    FailureKind, GenerationRequest, JobHandle, ProviderDescriptor, RawArtifact,
};
use coverai_providers::{CoverProvider, ProviderError, ProviderResult};
use coverai_storage::{LocalStore, StoreConfig};
use coverai_worker::{BatchRunner, FallbackCoordinator};

/// What a scripted provider does when driven.
#[derive(Clone)]
enum Script {
    /// Credential missing: submit fails instantly
    ConfigError,
    /// Sleep `polls` poll intervals, then produce a cover
    SucceedAfterPolls(u32),
    /// Poll the full budget away, then time out
    ExhaustBudget,
    /// Succeed unless the request title contains the marker
    SucceedUnlessTitle(&'static str),
}

struct ScriptedProvider {
    descriptor: ProviderDescriptor,
    script: Script,
    placeholder: bool,
    polls_made: AtomicU32,
    attempt_log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    fn build(
        name: &str,
        priority: u32,
        script: Script,
        placeholder: bool,
        attempt_log: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptor: ProviderDescriptor::new(name, priority)
                .with_max_attempts(5)
                .with_poll_interval_ms(100)
                .with_per_attempt_timeout_ms(1_000),
            script,
            placeholder,
            polls_made: AtomicU32::new(0),
            attempt_log,
        })
    }

    fn new(
        name: &str,
        priority: u32,
        script: Script,
        attempt_log: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Self::build(name, priority, script, false, attempt_log)
    }

    fn placeholder(
        name: &str,
        priority: u32,
        script: Script,
        attempt_log: Arc<Mutex<Vec<String>>>,
    ) -> Arc<Self> {
        Self::build(name, priority, script, true, attempt_log)
    }

    fn tiny_png() -> Vec<u8> {
        use image::{DynamicImage, RgbImage};
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([7, 7, 7])));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }
}

#[async_trait]
impl CoverProvider for ScriptedProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn submit(&self, _request: &GenerationRequest) -> ProviderResult<JobHandle> {
        self.attempt_log
            .lock()
            .unwrap()
            .push(self.name().to_string());
        if matches!(self.script, Script::ConfigError) {
            return Err(ProviderError::config("API key not set"));
        }
        Ok(JobHandle::new(self.name(), "scripted"))
    }

    async fn await_result(
        &self,
        _handle: &JobHandle,
        request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact> {
        match &self.script {
            Script::ConfigError => unreachable!("submit already failed"),
            Script::SucceedAfterPolls(polls) => {
                for _ in 0..*polls {
                    self.polls_made.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(self.descriptor.poll_interval()).await;
                }
                Ok(RawArtifact::from_bytes(Self::tiny_png()))
            }
            Script::ExhaustBudget => {
                for _ in 0..self.descriptor.max_attempts {
                    self.polls_made.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(self.descriptor.poll_interval()).await;
                }
                Err(ProviderError::Timeout {
                    attempts: self.descriptor.max_attempts,
                })
            }
            Script::SucceedUnlessTitle(marker) => {
                if request.title.contains(marker) {
                    Err(ProviderError::job_failed("disabled for this title"))
                } else {
                    Ok(RawArtifact::from_bytes(Self::tiny_png()))
                }
            }
        }
    }

    fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

async fn coordinator(
    providers: Vec<Arc<dyn CoverProvider>>,
) -> (tempfile::TempDir, Arc<FallbackCoordinator>) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open(StoreConfig {
        root: dir.path().join("store"),
        public_base: "/media".to_string(),
    })
    .await
    .unwrap();
    let post = Arc::new(PostProcessor::new(
        store,
        Arc::new(NoopWatermarker),
        dir.path().join("work"),
    ));
    (
        dir,
        Arc::new(FallbackCoordinator::new(providers, post, 2)),
    )
}

#[tokio::test(start_paused = true)]
async fn scenario_a_config_error_then_second_provider_succeeds() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let p1 = ScriptedProvider::new("p1", 1, Script::ConfigError, log.clone());
    let p2 = ScriptedProvider::new("p2", 2, Script::SucceedAfterPolls(3), log.clone());
    let placeholder = ScriptedProvider::placeholder(
        "builtin",
        100,
        Script::SucceedUnlessTitle("never"),
        log.clone(),
    );

    let (_dir, coordinator) =
        coordinator(vec![p1.clone(), p2.clone(), placeholder.clone()]).await;
    let request = GenerationRequest::new("ETH merge recap").with_dimensions(16, 8);
    let result = coordinator.generate(&request).await;

    assert!(result.success);
    assert!(!result.degraded);
    assert_eq!(result.provider_used.as_deref(), Some("p2"));
    assert_eq!(p2.polls_made.load(Ordering::SeqCst), 3);

    // P1's failure is recorded with its classification, nothing dropped
    assert_eq!(result.errors_by_provider.len(), 1);
    assert_eq!(result.errors_by_provider[0].provider, "p1");
    assert_eq!(result.errors_by_provider[0].kind, FailureKind::Config);

    // Placeholder never attempted once p2 succeeded
    assert_eq!(*log.lock().unwrap(), vec!["p1", "p2"]);
}

#[tokio::test(start_paused = true)]
async fn scenario_b_all_real_providers_exhaust_placeholder_saves_request() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let p1 = ScriptedProvider::new("p1", 1, Script::ExhaustBudget, log.clone());
    let p2 = ScriptedProvider::new("p2", 2, Script::ExhaustBudget, log.clone());
    let placeholder = ScriptedProvider::placeholder(
        "builtin",
        100,
        Script::SucceedUnlessTitle("never"),
        log.clone(),
    );

    let (_dir, coordinator) = coordinator(vec![p1, p2, placeholder]).await;
    let request = GenerationRequest::new("DAG quarterly review").with_dimensions(16, 8);
    let result = coordinator.generate(&request).await;

    assert!(result.success);
    assert!(result.degraded);
    assert_eq!(result.provider_used.as_deref(), Some("builtin"));
    assert_eq!(result.metadata.method, "builtin_fallback");

    assert_eq!(result.errors_by_provider.len(), 2);
    assert!(result
        .errors_by_provider
        .iter()
        .all(|f| f.kind == FailureKind::Timeout));
}

#[tokio::test(start_paused = true)]
async fn providers_attempted_in_strict_priority_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    // Deliberately constructed out of order
    let p3 = ScriptedProvider::new("p3", 30, Script::ConfigError, log.clone());
    let p1 = ScriptedProvider::new("p1", 10, Script::ConfigError, log.clone());
    let p2 = ScriptedProvider::new("p2", 20, Script::ConfigError, log.clone());
    let placeholder = ScriptedProvider::placeholder(
        "builtin",
        100,
        Script::SucceedUnlessTitle("never"),
        log.clone(),
    );

    let (_dir, coordinator) = coordinator(vec![p3, p1, p2, placeholder]).await;
    let request = GenerationRequest::new("Order check").with_dimensions(16, 8);
    let result = coordinator.generate(&request).await;

    assert_eq!(*log.lock().unwrap(), vec!["p1", "p2", "p3", "builtin"]);
    // Every skipped provider has a recorded reason, in attempt order
    let recorded: Vec<_> = result
        .errors_by_provider
        .iter()
        .map(|f| f.provider.as_str())
        .collect();
    assert_eq!(recorded, vec!["p1", "p2", "p3"]);
}

#[tokio::test(start_paused = true)]
async fn config_error_consumes_no_time_budget() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let misconfigured = ScriptedProvider::new("p1", 1, Script::ConfigError, log.clone());
    let instant = ScriptedProvider::new("p2", 2, Script::SucceedAfterPolls(0), log.clone());

    let (_dir, coordinator) = coordinator(vec![misconfigured, instant]).await;
    let request = GenerationRequest::new("Fast skip").with_dimensions(16, 8);

    let before = tokio::time::Instant::now();
    let result = coordinator.generate(&request).await;
    let elapsed = before.elapsed();

    assert!(result.success);
    // Paused clock: only poll-interval sleeps advance time, and the
    // misconfigured provider must not have scheduled any.
    assert_eq!(elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn scenario_c_batch_isolates_the_fully_failing_item() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let flaky = ScriptedProvider::new(
        "p1",
        1,
        Script::SucceedUnlessTitle("doomed"),
        log.clone(),
    );
    // Placeholder disabled for the doomed title, so that one item can
    // genuinely exhaust the whole chain.
    let placeholder = ScriptedProvider::placeholder(
        "builtin",
        100,
        Script::SucceedUnlessTitle("doomed"),
        log.clone(),
    );

    let (_dir, coordinator) = coordinator(vec![flaky, placeholder]).await;
    let runner = BatchRunner::new(coordinator, 3, Duration::from_millis(10));

    let mut requests: Vec<GenerationRequest> = (0..9)
        .map(|i| GenerationRequest::new(format!("story {i}")).with_dimensions(16, 8))
        .collect();
    requests.push(GenerationRequest::new("doomed story").with_dimensions(16, 8));

    let report = runner.run(requests).await;

    assert_eq!(report.total, 10);
    assert_eq!(report.succeeded, 9);
    assert_eq!(report.failed, 1);

    let doomed = report
        .items
        .iter()
        .find(|i| i.title.contains("doomed"))
        .expect("doomed item present in report");
    assert!(!doomed.result.success);
    assert_eq!(doomed.result.errors_by_provider.len(), 2);
}
