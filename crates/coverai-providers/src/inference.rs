//! Dedicated inference endpoint adapter (submit-then-poll protocol).
//!
//! The backend accepts a generation payload, returns a job id immediately,
//! and exposes a status endpoint that is polled until the job completes.

use async_trait::async_trait;
use coverai_models::{
    GenerationRequest, JobHandle, JobStatus, ProviderDescriptor, RawArtifact,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapter::{require_credential, CoverProvider};
use crate::error::{ProviderError, ProviderResult};
use crate::poll::{parse_job_status, AttemptBudget};
use crate::prompt::{build_prompt, DIFFUSION_STEPS, GUIDANCE_SCALE, NEGATIVE_PROMPT};

/// Status calls on which a 404 is still tolerated: the job may not be
/// visible immediately after submission.
const NOT_FOUND_GRACE_ATTEMPTS: u32 = 3;

/// Adapter for a dedicated diffusion inference API.
pub struct InferenceProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    guidance_scale: f32,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    output: Option<StatusOutput>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusOutput {
    url: String,
}

impl InferenceProvider {
    /// Create an adapter against `base_url`.
    pub fn new(descriptor: ProviderDescriptor, base_url: impl Into<String>) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(descriptor.per_attempt_timeout())
            .build()
            .map_err(|e| ProviderError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            descriptor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch_status(&self, api_key: &str, job_id: &str) -> ProviderResult<StatusResponse> {
        let url = format!("{}/status/{}", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ProviderError::decode("job not found")),
            status if status.is_success() => Ok(response.json::<StatusResponse>().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::network(format!(
                    "status call returned {status}: {body}"
                )))
            }
        }
    }
}

#[async_trait]
impl CoverProvider for InferenceProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &GenerationRequest) -> ProviderResult<JobHandle> {
        let api_key = require_credential(&self.descriptor)?
            .unwrap_or_default();

        let prompt = build_prompt(request);
        let payload = SubmitRequest {
            prompt: &prompt,
            negative_prompt: NEGATIVE_PROMPT,
            width: request.canonical_width,
            height: request.canonical_height,
            steps: DIFFUSION_STEPS,
            guidance_scale: GUIDANCE_SCALE,
        };

        debug!(provider = self.name(), "Submitting generation job");

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(&api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(format!(
                "submit returned {status}: {body}"
            )));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("bad submit response: {e}")))?;

        info!(provider = self.name(), job_id = %submit.job_id, "Job submitted");
        Ok(JobHandle::new(self.name(), submit.job_id))
    }

    async fn await_result(
        &self,
        handle: &JobHandle,
        _request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact> {
        let api_key = require_credential(&self.descriptor)?.unwrap_or_default();
        let mut budget = AttemptBudget::start(&self.descriptor);

        loop {
            budget.take_attempt()?;

            let status = match self.fetch_status(&api_key, &handle.external_id).await {
                Ok(status) => status,
                // The job may not be visible right after submission; treat
                // an early not-found as one more queued poll.
                Err(ProviderError::Decode(msg)) if msg == "job not found" => {
                    if budget.attempts() > NOT_FOUND_GRACE_ATTEMPTS {
                        // Job never became visible: no artifact after the
                        // grace window is a timeout, not a decode failure.
                        return Err(budget.exhausted());
                    }
                    debug!(
                        provider = self.name(),
                        attempt = budget.attempts(),
                        "Job not visible yet, retrying"
                    );
                    budget.wait().await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match parse_job_status(&status.status)? {
                JobStatus::Completed => {
                    let output = status.output.ok_or_else(|| {
                        ProviderError::decode("completed status without an output locator")
                    })?;
                    info!(
                        provider = self.name(),
                        attempts = budget.attempts(),
                        "Job completed"
                    );
                    return Ok(RawArtifact::from_remote(output.url));
                }
                JobStatus::Failed => {
                    let message = status.error.unwrap_or_else(|| "unspecified".to_string());
                    warn!(provider = self.name(), error = %message, "Job failed");
                    return Err(ProviderError::job_failed(message));
                }
                JobStatus::Queued | JobStatus::Running => {
                    debug!(
                        provider = self.name(),
                        attempt = budget.attempts(),
                        status = %status.status,
                        "Job still pending"
                    );
                    budget.wait().await;
                }
                // Local bookkeeping state, never reported by the wire
                JobStatus::TimedOut => return Err(budget.exhausted()),
            }
        }
    }
}
