//! Worker configuration.

use std::sync::Arc;
use std::time::Duration;

use coverai_models::ProviderDescriptor;
use coverai_providers::{
    BuiltinProvider, CoverProvider, InferenceProvider, SpacesProvider, UrlImageProvider,
};
use tracing::info;

use crate::error::WorkerResult;

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_u32(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Scratch directory for post-processing intermediates
    pub work_dir: String,
    /// Maximum batch items processed concurrently
    pub batch_max_concurrent: usize,
    /// Delay between batch item spawns (burst smoothing)
    pub batch_item_delay: Duration,
    /// Maximum concurrent in-flight jobs per provider
    pub per_provider_inflight: usize,
    /// Dedicated inference endpoint, if configured
    pub inference_url: Option<String>,
    /// Hosted space endpoint, if configured
    pub spaces_url: Option<String>,
    /// Render-on-GET endpoint, if configured
    pub render_url: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/coverai".to_string(),
            batch_max_concurrent: 2,
            batch_item_delay: Duration::from_millis(500),
            per_provider_inflight: 2,
            inference_url: None,
            spaces_url: None,
            render_url: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("COVERAI_WORK_DIR")
                .unwrap_or_else(|_| "/tmp/coverai".to_string()),
            batch_max_concurrent: env_u64("COVERAI_BATCH_MAX_CONCURRENT", 2) as usize,
            batch_item_delay: Duration::from_millis(env_u64("COVERAI_BATCH_ITEM_DELAY_MS", 500)),
            per_provider_inflight: env_u64("COVERAI_PROVIDER_MAX_INFLIGHT", 2) as usize,
            inference_url: std::env::var("COVERAI_INFERENCE_URL").ok(),
            spaces_url: std::env::var("COVERAI_SPACES_URL").ok(),
            render_url: std::env::var("COVERAI_RENDER_URL").ok(),
        }
    }

    /// Build the fallback chain from the configured endpoints.
    ///
    /// Priority order is fixed: dedicated inference endpoint, hosted space,
    /// render-on-GET service, builtin placeholder. Providers without a
    /// configured endpoint are left out; the placeholder is always last so
    /// the chain can never be empty.
    pub fn build_chain(&self) -> WorkerResult<Vec<Arc<dyn CoverProvider>>> {
        let mut chain: Vec<Arc<dyn CoverProvider>> = Vec::new();

        if let Some(url) = &self.inference_url {
            let descriptor = ProviderDescriptor::new("inference", 1)
                .with_max_attempts(env_u32("COVERAI_INFERENCE_MAX_ATTEMPTS", 30))
                .with_poll_interval_ms(env_u64("COVERAI_INFERENCE_POLL_MS", 2_000))
                .with_per_attempt_timeout_ms(env_u64("COVERAI_INFERENCE_TIMEOUT_MS", 30_000))
                .with_credential("COVERAI_INFERENCE_API_KEY");
            chain.push(Arc::new(InferenceProvider::new(descriptor, url)?));
        }

        if let Some(url) = &self.spaces_url {
            let descriptor = ProviderDescriptor::new("spaces", 2)
                .with_max_attempts(env_u32("COVERAI_SPACES_MAX_ATTEMPTS", 60))
                .with_poll_interval_ms(env_u64("COVERAI_SPACES_POLL_MS", 3_000))
                .with_per_attempt_timeout_ms(env_u64("COVERAI_SPACES_TIMEOUT_MS", 30_000));
            chain.push(Arc::new(SpacesProvider::new(descriptor, url)?));
        }

        if let Some(url) = &self.render_url {
            let descriptor = ProviderDescriptor::new("render", 3)
                .with_max_attempts(1)
                .with_poll_interval_ms(0)
                .with_per_attempt_timeout_ms(env_u64("COVERAI_RENDER_TIMEOUT_MS", 45_000));
            chain.push(Arc::new(UrlImageProvider::new(descriptor, url)?));
        }

        chain.push(Arc::new(BuiltinProvider::with_priority(100)));

        info!(
            providers = chain.len(),
            "Built fallback chain: {}",
            chain
                .iter()
                .map(|p| p.name().to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_always_ends_with_placeholder() {
        let config = WorkerConfig::default();
        let chain = config.build_chain().unwrap();
        assert_eq!(chain.len(), 1);
        assert!(chain.last().unwrap().is_placeholder());
    }

    #[test]
    fn test_configured_endpoints_ordered_by_priority() {
        let config = WorkerConfig {
            inference_url: Some("https://infer.example".to_string()),
            spaces_url: Some("https://space.example".to_string()),
            render_url: Some("https://render.example".to_string()),
            ..Default::default()
        };
        let chain = config.build_chain().unwrap();
        let names: Vec<_> = chain.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, ["inference", "spaces", "render", "builtin"]);

        let priorities: Vec<_> = chain.iter().map(|p| p.descriptor().priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
    }
}
