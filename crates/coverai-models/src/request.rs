//! Generation request model.

use serde::{Deserialize, Serialize};

use crate::style::{CoverStyle, Network};

/// Default canonical cover width (pixels).
pub const DEFAULT_COVER_WIDTH: u32 = 1800;

/// Default canonical cover height (pixels).
pub const DEFAULT_COVER_HEIGHT: u32 = 900;

/// A request to generate one cover image.
///
/// Built once per caller invocation and never mutated afterwards. The
/// canonical dimensions are what the post-processor enforces on the final
/// artifact regardless of what a provider returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Article headline the cover is for
    pub title: String,
    /// Optional extra context from the article body
    #[serde(default)]
    pub content_hint: Option<String>,
    /// Network branding to apply
    #[serde(default)]
    pub network: Network,
    /// Visual style of the background
    #[serde(default)]
    pub style: CoverStyle,
    /// Final output width enforced by the post-processor
    #[serde(default = "default_width")]
    pub canonical_width: u32,
    /// Final output height enforced by the post-processor
    #[serde(default = "default_height")]
    pub canonical_height: u32,
}

fn default_width() -> u32 {
    DEFAULT_COVER_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_COVER_HEIGHT
}

impl GenerationRequest {
    /// Create a request with default style, branding, and dimensions.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content_hint: None,
            network: Network::default(),
            style: CoverStyle::default(),
            canonical_width: DEFAULT_COVER_WIDTH,
            canonical_height: DEFAULT_COVER_HEIGHT,
        }
    }

    /// Set the network branding.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Set the background style.
    pub fn with_style(mut self, style: CoverStyle) -> Self {
        self.style = style;
        self
    }

    /// Set an article content hint.
    pub fn with_content_hint(mut self, hint: impl Into<String>) -> Self {
        self.content_hint = Some(hint.into());
        self
    }

    /// Override the canonical output dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.canonical_width = width;
        self.canonical_height = height;
        self
    }
}
