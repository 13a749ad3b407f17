//! Built-in placeholder provider.
//!
//! Renders a branded gradient cover locally with no external dependency, so
//! the fallback chain always terminates with an artifact. Results from this
//! provider are reported as degraded so callers can distinguish them from
//! genuine generation.

use async_trait::async_trait;
use coverai_models::{
    BrandPalette, GenerationRequest, JobHandle, ProviderDescriptor, RawArtifact,
};
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgb, RgbImage};
use tracing::info;
use uuid::Uuid;

use crate::adapter::CoverProvider;
use crate::error::{ProviderError, ProviderResult};

/// Zero-dependency placeholder at the tail of every fallback chain.
pub struct BuiltinProvider {
    descriptor: ProviderDescriptor,
}

impl BuiltinProvider {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self { descriptor }
    }

    /// Placeholder with default descriptor at the given priority.
    pub fn with_priority(priority: u32) -> Self {
        Self::new(
            ProviderDescriptor::new("builtin", priority)
                .with_max_attempts(1)
                .with_poll_interval_ms(0),
        )
    }
}

/// Render the branded background: vertical gradient between the network's
/// secondary and primary colors with a radial energy glow at the center.
fn render_background(width: u32, height: u32, palette: &BrandPalette) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let t = y as f32 / height.max(1) as f32;
        let mut channel = [0u8; 3];
        for c in 0..3 {
            let base = palette.secondary[c] as f32
                + t * (palette.primary[c] as f32 - palette.secondary[c] as f32);

            // Radial glow fades with distance from center
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let glow = (1.0 - dist / max_dist).max(0.0).powi(2) * 0.35;
            let lit = base + glow * (palette.energy[c] as f32 - base);

            channel[c] = lit.clamp(0.0, 255.0) as u8;
        }
        *pixel = Rgb(channel);
    }
    img
}

#[async_trait]
impl CoverProvider for BuiltinProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn submit(&self, _request: &GenerationRequest) -> ProviderResult<JobHandle> {
        Ok(JobHandle::new(
            self.name(),
            Uuid::new_v4().simple().to_string(),
        ))
    }

    async fn await_result(
        &self,
        _handle: &JobHandle,
        request: &GenerationRequest,
    ) -> ProviderResult<RawArtifact> {
        let palette = request.network.palette();
        let img = render_background(
            request.canonical_width.max(1),
            request.canonical_height.max(1),
            &palette,
        );

        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| ProviderError::decode(format!("placeholder encode failed: {e}")))?;

        info!(
            provider = self.name(),
            network = %request.network,
            "Rendered builtin fallback cover"
        );
        Ok(RawArtifact::from_bytes(bytes)
            .with_reported_dimensions(img.width(), img.height()))
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverai_models::{ArtifactData, Network};

    #[tokio::test]
    async fn test_placeholder_always_produces_an_artifact() {
        let provider = BuiltinProvider::with_priority(100);
        let request = GenerationRequest::new("Fallback cover")
            .with_network(Network::Hedera)
            .with_dimensions(180, 90);

        let handle = provider.submit(&request).await.unwrap();
        let artifact = provider.await_result(&handle, &request).await.unwrap();

        match artifact.data {
            ArtifactData::Bytes(bytes) => {
                // PNG signature
                assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
            }
            ArtifactData::Remote(_) => panic!("placeholder must return inline bytes"),
        }
        assert_eq!(artifact.reported_width, Some(180));
        assert_eq!(artifact.reported_height, Some(90));
    }

    #[test]
    fn test_gradient_blends_palette() {
        let palette = Network::Bitcoin.palette();
        let img = render_background(64, 64, &palette);
        let top = img.get_pixel(0, 0);
        let bottom = img.get_pixel(0, 63);
        // Gradient runs secondary (top) to primary (bottom)
        assert_ne!(top, bottom);
    }
}
