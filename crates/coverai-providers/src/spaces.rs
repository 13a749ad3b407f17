//! Hosted-space adapter (queue/event-stream protocol).
//!
//! The backend is a Gradio-style shared space: submission joins a queue and
//! returns an event id; subsequent reads yield newline-delimited tagged JSON
//! records for that event until a terminal record arrives. The terminal
//! record carries either an inline base64 image or a file reference.

use async_trait::async_trait;
use base64::Engine;
use coverai_models::{
    ArtifactData, GenerationRequest, JobHandle, ProviderDescriptor, RawArtifact,
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapter::{require_credential, CoverProvider};
use crate::backoff::{retry_transient, BackoffPolicy};
use crate::error::{ProviderError, ProviderResult};
use crate::poll::{AttemptBudget, PollEvent, PollPhase};

/// Adapter for a hosted generation space with a queued event stream.
pub struct SpacesProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    client: Client,
    backoff: BackoffPolicy,
}

#[derive(Debug, Deserialize)]
struct JoinResponse {
    event_id: String,
}

/// One tagged record from the event stream.
#[derive(Debug, Deserialize)]
struct StreamRecord {
    msg: String,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    eta: Option<f64>,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl SpacesProvider {
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
            backoff: BackoffPolicy::default(),
        })
    }

    /// Read the next batch of records for an event.
    async fn read_records(&self, event_id: &str) -> ProviderResult<Vec<StreamRecord>> {
        let url = format!("{}/queue/data/{}", self.base_url, event_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::network(format!(
                "event read returned {status}"
            )));
        }

        let body = response.text().await?;
        let mut records = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            // SSE framing wraps payloads as "data: {...}"; tolerate bare JSON too
            let payload = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
            if payload.is_empty() {
                continue;
            }
            match serde_json::from_str::<StreamRecord>(payload) {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!(provider = self.name(), "Skipping unparseable record: {e}");
                }
            }
        }
        Ok(records)
    }

    /// Pull the artifact out of a `process_completed` record.
    ///
    /// The locator is either an inline data URL or a `{url|path}` reference;
    /// both are handled here so the poll loop has a single extraction step.
    fn extract_artifact(&self, output: &Value) -> ProviderResult<RawArtifact> {
        let first = output
            .get("data")
            .and_then(|d| d.get(0))
            .ok_or_else(|| ProviderError::decode("completed record carries no output data"))?;

        if let Some(inline) = first.as_str() {
            return decode_data_url(inline);
        }

        if let Some(url) = first.get("url").and_then(|u| u.as_str()) {
            return Ok(RawArtifact::from_remote(url));
        }

        if let Some(path) = first.get("path").and_then(|p| p.as_str()) {
            let url = format!("{}/file={}", self.base_url, path);
            return Ok(RawArtifact::from_remote(url));
        }

        Err(ProviderError::decode(
            "output data is neither inline nor a file reference",
        ))
    }
}

/// Decode an inline `data:image/...;base64,` payload.
fn decode_data_url(raw: &str) -> ProviderResult<RawArtifact> {
    let encoded = raw
        .split_once(";base64,")
        .map(|(_, rest)| rest)
        .ok_or_else(|| ProviderError::decode("inline payload is not a base64 data URL"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProviderError::decode(format!("invalid base64 payload: {e}")))?;
    Ok(RawArtifact::from_bytes(bytes))
}

#[async_trait]
impl CoverProvider for SpacesProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn submit(&self, request: &GenerationRequest) -> ProviderResult<JobHandle> {
        require_credential(&self.descriptor)?;

        let session_hash = Uuid::new_v4().simple().to_string();
        let payload = serde_json::json!({
            "data": [
                request.title,
                request.content_hint.clone().unwrap_or_default(),
                request.network.as_str(),
                request.style.as_str(),
            ],
            "session_hash": session_hash,
        });

        debug!(provider = self.name(), "Joining generation queue");

        let response = self
            .client
            .post(format!("{}/queue/join", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::rejected(format!(
                "queue join returned {status}: {body}"
            )));
        }

        let join: JoinResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(format!("bad queue join response: {e}")))?;

        info!(provider = self.name(), event_id = %join.event_id, "Joined queue");
        Ok(JobHandle::new(self.name(), join.event_id))
    }

    async fn await_result(
        &self,
        handle: &JobHandle,
        _request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact> {
        let mut budget = AttemptBudget::start(&self.descriptor);
        let mut phase = PollPhase::Pending;

        // Once generation has started, completion is imminent; poll faster.
        let slow = self.descriptor.poll_interval();
        let fast = slow / 4;

        loop {
            budget.take_attempt()?;

            let records = retry_transient(&self.backoff, self.name(), || {
                self.read_records(&handle.external_id)
            })
            .await?;

            for record in records {
                match record.msg.as_str() {
                    "estimation" => {
                        debug!(
                            provider = self.name(),
                            rank = ?record.rank,
                            eta = ?record.eta,
                            "Queued"
                        );
                        phase = phase.advance(PollEvent::Progress);
                    }
                    "process_starts" => {
                        debug!(provider = self.name(), "Generation started");
                        phase = phase.advance(PollEvent::Started);
                    }
                    "process_completed" => {
                        phase = phase.advance(PollEvent::Completed);
                        let output = record.output.ok_or_else(|| {
                            ProviderError::decode("completed record without output")
                        })?;
                        info!(
                            provider = self.name(),
                            attempts = budget.attempts(),
                            "Generation completed"
                        );
                        return self.extract_artifact(&output);
                    }
                    "error" => {
                        phase = phase.advance(PollEvent::Failed);
                        let message = record
                            .message
                            .unwrap_or_else(|| "unspecified space error".to_string());
                        warn!(provider = self.name(), error = %message, "Space reported failure");
                        return Err(ProviderError::job_failed(message));
                    }
                    other => {
                        debug!(provider = self.name(), msg = other, "Ignoring record");
                    }
                }
            }

            let cadence = if phase == PollPhase::Started { fast } else { slow };
            budget.wait_for(cadence).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_inline_data_url() {
        let png = [0x89u8, b'P', b'N', b'G'];
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        let artifact = decode_data_url(&format!("data:image/png;base64,{encoded}")).unwrap();
        match artifact.data {
            ArtifactData::Bytes(bytes) => assert_eq!(bytes, png),
            ArtifactData::Remote(_) => panic!("expected inline bytes"),
        }
    }

    #[test]
    fn test_decode_rejects_plain_string() {
        assert!(decode_data_url("https://example.com/cover.png").is_err());
    }

    #[test]
    fn test_extract_url_reference() {
        let provider = SpacesProvider::new(
            ProviderDescriptor::new("spaces", 2),
            "https://space.example",
        )
        .unwrap();
        let output = serde_json::json!({"data": [{"url": "https://cdn.example/c.png"}]});
        let artifact = provider.extract_artifact(&output).unwrap();
        match artifact.data {
            ArtifactData::Remote(url) => assert_eq!(url, "https://cdn.example/c.png"),
            ArtifactData::Bytes(_) => panic!("expected remote reference"),
        }
    }

    #[test]
    fn test_extract_path_reference_rebased_on_space() {
        let provider = SpacesProvider::new(
            ProviderDescriptor::new("spaces", 2),
            "https://space.example/",
        )
        .unwrap();
        let output = serde_json::json!({"data": [{"path": "/tmp/out/cover.png"}]});
        let artifact = provider.extract_artifact(&output).unwrap();
        match artifact.data {
            ArtifactData::Remote(url) => {
                assert_eq!(url, "https://space.example/file=/tmp/out/cover.png")
            }
            ArtifactData::Bytes(_) => panic!("expected remote reference"),
        }
    }
}
