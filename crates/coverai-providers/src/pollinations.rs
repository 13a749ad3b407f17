//! Immediate-URL adapter.
//!
//! The backend renders on GET: a single request against a deterministic URL
//! encoding the prompt and parameters returns image bytes directly. There is
//! no polling and no retry at this layer; if the fetch fails the coordinator
//! moves to the next provider.

use async_trait::async_trait;
use coverai_models::{GenerationRequest, JobHandle, ProviderDescriptor, RawArtifact};
use rand::Rng;
use reqwest::Client;
use tracing::{debug, info};

use crate::adapter::CoverProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::prompt::build_prompt;

/// Adapter for a render-on-GET image service.
pub struct UrlImageProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    client: Client,
}

impl UrlImageProvider {
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

    fn build_url(&self, request: &GenerationRequest, seed: u64) -> String {
        let prompt = build_prompt(request);
        format!(
            "{}/prompt/{}?width={}&height={}&seed={}&nologo=true",
            self.base_url,
            urlencoding::encode(&prompt),
            request.canonical_width,
            request.canonical_height,
            seed,
        )
    }
}

#[async_trait]
impl CoverProvider for UrlImageProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &GenerationRequest) -> ProviderResult<JobHandle> {
        // The submission is the fetch itself; the handle just carries the
        // deterministic URL for await_result to issue.
        let seed = rand::rng().random_range(1..=u32::MAX as u64);
        let url = self.build_url(request, seed);
        debug!(provider = self.name(), %url, "Prepared render URL");
        Ok(JobHandle::new(self.name(), url))
    }

    async fn await_result(
        &self,
        handle: &JobHandle,
        request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact> {
        let response = self.client.get(&handle.external_id).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::rejected(format!(
                "render returned {status}"
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::decode("render returned an empty body"));
        }

        info!(
            provider = self.name(),
            bytes = bytes.len(),
            "Fetched rendered cover"
        );
        Ok(RawArtifact::from_bytes(bytes.to_vec()).with_reported_dimensions(
            request.canonical_width,
            request.canonical_height,
        ))
    }
}
