//! Cover generation worker binary.
//!
//! Reads a JSON array of generation requests from the file given as the
//! first argument (or `COVERAI_BATCH_FILE`), runs the batch, and writes the
//! report as JSON to stdout.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coverai_media::{PngOverlayWatermarker, PostProcessor, WatermarkConfig};
use coverai_models::GenerationRequest;
use coverai_storage::LocalStore;
use coverai_worker::{BatchRunner, FallbackCoordinator, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("coverai=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting coverai-worker");

    if let Err(e) = run().await {
        error!("Worker failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let batch_file = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COVERAI_BATCH_FILE").ok())
        .ok_or_else(|| anyhow::anyhow!("usage: coverai-worker <requests.json>"))?;

    let raw = tokio::fs::read_to_string(&batch_file).await?;
    let requests: Vec<GenerationRequest> = serde_json::from_str(&raw)?;
    info!(count = requests.len(), file = %batch_file, "Loaded batch requests");

    let store = LocalStore::from_env().await?;
    let watermarker = Arc::new(PngOverlayWatermarker::new(WatermarkConfig::default()));
    let post = Arc::new(PostProcessor::new(store, watermarker, &config.work_dir));

    let chain = config.build_chain()?;
    let coordinator = Arc::new(FallbackCoordinator::new(
        chain,
        post,
        config.per_provider_inflight,
    ));

    let runner = BatchRunner::new(
        coordinator,
        config.batch_max_concurrent,
        config.batch_item_delay,
    );
    let report = runner.run(requests).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.total > 0 && report.failed == report.total {
        anyhow::bail!("every batch item failed");
    }
    Ok(())
}
