//! Result post-processing: turn a raw provider artifact into a stored cover.

use std::path::PathBuf;
use std::sync::Arc;

use coverai_models::{ArtifactData, GenerationRequest, RawArtifact};
use coverai_storage::LocalStore;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder};
use reqwest::Client;
use tempfile::TempDir;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};
use crate::resize::resize_cover;
use crate::watermark::Watermarker;

/// A cover that survived normalization and persistence.
#[derive(Debug, Clone)]
pub struct FinalizedCover {
    /// Storage key of the final artifact
    pub key: String,
    /// Stable public locator
    pub url: String,
    /// Local path on disk
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Normalizes winning artifacts: materialize, decode, enforce canonical
/// dimensions, watermark, persist.
///
/// Every intermediate file lives in a per-call scratch directory that is
/// removed on every exit path, including watermark/persist failures and
/// cancellation; the guarantee is drop-based, not best-effort.
pub struct PostProcessor {
    http: Client,
    store: LocalStore,
    watermarker: Arc<dyn Watermarker>,
    work_dir: PathBuf,
}

impl PostProcessor {
    pub fn new(
        store: LocalStore,
        watermarker: Arc<dyn Watermarker>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            http: Client::new(),
            store,
            watermarker,
            work_dir: work_dir.into(),
        }
    }

    /// Run the full normalization pipeline on a winning artifact.
    pub async fn finalize(
        &self,
        request: &GenerationRequest,
        artifact: RawArtifact,
        provider: &str,
    ) -> MediaResult<FinalizedCover> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        // Dropped on every exit path below, cleaning the scratch space.
        let scratch = TempDir::new_in(&self.work_dir)?;

        // Step 1: materialize bytes.
        let raw_bytes = self.materialize(&artifact.data).await?;
        let raw_path = scratch.path().join("raw");
        tokio::fs::write(&raw_path, &raw_bytes).await?;

        // Step 2: decode and inspect actual dimensions.
        let decoded = image::load_from_memory(&raw_bytes)
            .map_err(|e| MediaError::decode_failed(format!("{provider} artifact: {e}")))?;
        debug!(
            provider,
            width = decoded.width(),
            height = decoded.height(),
            reported_width = ?artifact.reported_width,
            reported_height = ?artifact.reported_height,
            "Decoded raw artifact"
        );

        // Step 3: enforce canonical dimensions.
        let normalized = resize_cover(
            decoded,
            request.canonical_width,
            request.canonical_height,
        );

        // Step 4: watermark.
        let stamped = self.watermarker.apply(normalized, request).await?;

        // Step 5: encode and persist.
        let final_bytes = encode_png(&stamped)?;
        let id = Uuid::new_v4().simple().to_string();
        let stored = self.store.save_cover(&id, &final_bytes).await?;

        info!(
            provider,
            key = %stored.key,
            bytes = final_bytes.len(),
            "Finalized cover"
        );

        Ok(FinalizedCover {
            key: stored.key,
            url: stored.url,
            path: stored.path,
            width: stamped.width(),
            height: stamped.height(),
        })
    }

    /// Fetch remote artifacts; inline bytes pass straight through.
    async fn materialize(&self, data: &ArtifactData) -> MediaResult<Vec<u8>> {
        match data {
            ArtifactData::Bytes(bytes) => Ok(bytes.clone()),
            ArtifactData::Remote(url) => {
                debug!(%url, "Fetching remote artifact");
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| MediaError::fetch_failed(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(MediaError::fetch_failed(format!(
                        "{url} returned {}",
                        response.status()
                    )));
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| MediaError::fetch_failed(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

fn encode_png(img: &DynamicImage) -> MediaResult<Vec<u8>> {
    let rgba = img.to_rgba8();
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::NoopWatermarker;
    use async_trait::async_trait;
    use coverai_storage::{StoreConfig, LocalStore};
    use image::{Rgb, RgbImage};

    struct FailingWatermarker;

    #[async_trait]
    impl Watermarker for FailingWatermarker {
        async fn apply(
            &self,
            _image: DynamicImage,
            _request: &GenerationRequest,
        ) -> MediaResult<DynamicImage> {
            Err(MediaError::watermark_failed("injected failure"))
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 9, 9])));
        encode_png(&img).unwrap()
    }

    async fn setup(
        watermarker: Arc<dyn Watermarker>,
    ) -> (tempfile::TempDir, PathBuf, PostProcessor) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(StoreConfig {
            root: dir.path().join("store"),
            public_base: "/media".to_string(),
        })
        .await
        .unwrap();
        let work_dir = dir.path().join("work");
        let post = PostProcessor::new(store, watermarker, &work_dir);
        (dir, work_dir, post)
    }

    fn leftover_entries(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_finalize_enforces_canonical_dimensions() {
        let (_dir, _work, post) = setup(Arc::new(NoopWatermarker)).await;
        let request = GenerationRequest::new("t").with_dimensions(180, 90);
        // Provider ignored the requested size entirely
        let artifact = RawArtifact::from_bytes(png_bytes(300, 300));

        let cover = post.finalize(&request, artifact, "test").await.unwrap();
        assert_eq!((cover.width, cover.height), (180, 90));
        assert!(cover.url.starts_with("/media/covers/"));
        assert!(cover.path.exists());
    }

    #[tokio::test]
    async fn test_no_temp_files_after_success() {
        let (_dir, work_dir, post) = setup(Arc::new(NoopWatermarker)).await;
        let request = GenerationRequest::new("t").with_dimensions(64, 32);
        let artifact = RawArtifact::from_bytes(png_bytes(64, 32));

        post.finalize(&request, artifact, "test").await.unwrap();
        assert_eq!(leftover_entries(&work_dir), 0);
    }

    #[tokio::test]
    async fn test_no_temp_files_after_watermark_failure() {
        let (_dir, work_dir, post) = setup(Arc::new(FailingWatermarker)).await;
        let request = GenerationRequest::new("t").with_dimensions(64, 32);
        let artifact = RawArtifact::from_bytes(png_bytes(64, 32));

        let err = post.finalize(&request, artifact, "test").await.unwrap_err();
        assert!(matches!(err, MediaError::WatermarkFailed(_)));
        assert_eq!(leftover_entries(&work_dir), 0);
    }

    #[tokio::test]
    async fn test_garbage_bytes_is_decode_error() {
        let (_dir, work_dir, post) = setup(Arc::new(NoopWatermarker)).await;
        let request = GenerationRequest::new("t");
        let artifact = RawArtifact::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);

        let err = post.finalize(&request, artifact, "test").await.unwrap_err();
        assert!(matches!(err, MediaError::DecodeFailed(_)));
        assert_eq!(leftover_entries(&work_dir), 0);
    }

    #[tokio::test]
    async fn test_remote_artifact_fetched() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cover.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(100, 50)))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, _work, post) = setup(Arc::new(NoopWatermarker)).await;
        let request = GenerationRequest::new("t").with_dimensions(80, 40);
        let artifact = RawArtifact::from_remote(format!("{}/cover.png", server.uri()));

        let cover = post.finalize(&request, artifact, "test").await.unwrap();
        assert_eq!((cover.width, cover.height), (80, 40));
    }

    #[tokio::test]
    async fn test_remote_fetch_http_error() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (_dir, _work, post) = setup(Arc::new(NoopWatermarker)).await;
        let request = GenerationRequest::new("t");
        let artifact = RawArtifact::from_remote(format!("{}/gone.png", server.uri()));

        let err = post.finalize(&request, artifact, "test").await.unwrap_err();
        assert!(matches!(err, MediaError::FetchFailed(_)));
    }
}
