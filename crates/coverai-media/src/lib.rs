//! Cover post-processing for the CoverAI backend.
//!
//! This crate provides:
//! - [`PostProcessor`]: materialize, decode, canonical resize, watermark,
//!   persist, with scoped temp-file cleanup on every exit path
//! - The [`Watermarker`] capability boundary and the PNG overlay
//!   implementation
//! - Fill/cover resize semantics

pub mod error;
pub mod postprocess;
pub mod resize;
pub mod watermark;

pub use error::{MediaError, MediaResult};
pub use postprocess::{FinalizedCover, PostProcessor};
pub use resize::resize_cover;
pub use watermark::{
    NoopWatermarker, PngOverlayWatermarker, WatermarkConfig, Watermarker,
    DEFAULT_WATERMARK_PATH,
};
