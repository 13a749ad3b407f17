//! Canonical-dimension enforcement.

use image::imageops::FilterType;
use image::DynamicImage;

/// Force an image to exactly `width x height` using fill/cover semantics:
/// scale until both dimensions are covered, then center-crop the overflow.
///
/// Providers are not trusted to honor requested dimensions, so this runs on
/// every artifact whose actual size differs from the canonical one.
pub fn resize_cover(img: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img;
    }

    let scale_w = width as f64 / img.width() as f64;
    let scale_h = height as f64 / img.height() as f64;
    let scale = scale_w.max(scale_h);

    let scaled_w = (img.width() as f64 * scale).ceil() as u32;
    let scaled_h = (img.height() as f64 * scale).ceil() as u32;

    let scaled = img.resize_exact(scaled_w.max(width), scaled_h.max(height), FilterType::Lanczos3);

    let x = (scaled.width() - width) / 2;
    let y = (scaled.height() - height) / 2;
    scaled.crop_imm(x, y, width, height)
}
