//! Watermarking capability boundary.
//!
//! The watermark renderer is an external collaborator; the post-processor
//! only depends on the [`Watermarker`] trait. The bundled implementation
//! composites a transparent PNG overlay across the cover, which is what the
//! production asset expects.

use std::path::Path;

use async_trait::async_trait;
use coverai_models::GenerationRequest;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Default watermark asset path in the production container.
pub const DEFAULT_WATERMARK_PATH: &str = "/app/assets/watermark.png";

/// Development fallback paths to check.
const DEV_WATERMARK_PATHS: &[&str] = &["./assets/watermark.png", "../assets/watermark.png"];

/// External watermarking capability.
///
/// Receives the full request so placement can react to style and branding.
#[async_trait]
pub trait Watermarker: Send + Sync {
    async fn apply(
        &self,
        image: DynamicImage,
        request: &GenerationRequest,
    ) -> MediaResult<DynamicImage>;
}

/// Configuration for the PNG overlay watermarker.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Path to the watermark image (PNG with transparency)
    pub image_path: String,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            image_path: resolve_watermark_path(),
            opacity: 0.9,
        }
    }
}

impl WatermarkConfig {
    /// Create config with a custom image path.
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = path.into();
        self
    }

    /// Set overlay opacity (0.0 = invisible, 1.0 = fully opaque).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Check if the watermark asset exists.
    pub fn is_available(&self) -> bool {
        Path::new(&self.image_path).exists()
    }
}

/// Resolve the watermark path, checking dev fallbacks when the production
/// path is missing.
fn resolve_watermark_path() -> String {
    if Path::new(DEFAULT_WATERMARK_PATH).exists() {
        return DEFAULT_WATERMARK_PATH.to_string();
    }
    for path in DEV_WATERMARK_PATHS {
        if Path::new(path).exists() {
            debug!(path = path, "Found watermark at dev fallback path");
            return path.to_string();
        }
    }
    DEFAULT_WATERMARK_PATH.to_string()
}

/// Composites a full-bleed transparent PNG over the cover.
pub struct PngOverlayWatermarker {
    config: WatermarkConfig,
}

impl PngOverlayWatermarker {
    pub fn new(config: WatermarkConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Watermarker for PngOverlayWatermarker {
    async fn apply(
        &self,
        image: DynamicImage,
        _request: &GenerationRequest,
    ) -> MediaResult<DynamicImage> {
        if !self.config.is_available() {
            // Missing asset is a deploy-time condition, not a per-request failure
            warn!(
                path = %self.config.image_path,
                "Watermark asset missing, passing cover through"
            );
            return Ok(image);
        }

        let overlay = image::open(&self.config.image_path)
            .map_err(|e| MediaError::watermark_failed(format!("cannot open overlay: {e}")))?;
        let overlay = overlay
            .resize_exact(image.width(), image.height(), FilterType::Lanczos3)
            .to_rgba8();

        let mut base = image.to_rgba8();
        let opacity = self.config.opacity;
        for (base_px, overlay_px) in base.pixels_mut().zip(overlay.pixels()) {
            let alpha = (overlay_px[3] as f32 / 255.0) * opacity;
            for c in 0..3 {
                let blended =
                    base_px[c] as f32 * (1.0 - alpha) + overlay_px[c] as f32 * alpha;
                base_px[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(DynamicImage::ImageRgba8(base))
    }
}

/// Pass-through watermarker for deployments without a watermark asset.
pub struct NoopWatermarker;

#[async_trait]
impl Watermarker for NoopWatermarker {
    async fn apply(
        &self,
        image: DynamicImage,
        _request: &GenerationRequest,
    ) -> MediaResult<DynamicImage> {
        Ok(image)
    }
}
