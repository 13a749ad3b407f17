//! Prompt assembly for diffusion backends.
//!
//! The actual copywriting lives with the editorial side; this module only
//! assembles the structural prompt a backend needs from the request's style
//! and network branding.

use coverai_models::GenerationRequest;

/// Negative prompt sent to every diffusion backend.
pub const NEGATIVE_PROMPT: &str =
    "text, letters, words, watermark, signature, blurry, low quality";

/// Inference steps requested from diffusion backends.
pub const DIFFUSION_STEPS: u32 = 20;

/// Guidance scale requested from diffusion backends.
pub const GUIDANCE_SCALE: f32 = 7.5;

/// Build the positive prompt for a request.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "crypto news cover background, {}, {} branding, professional design",
        request.style.scene_phrase(),
        request.network
    );
    if let Some(hint) = &request.content_hint {
        prompt.push_str(", ");
        prompt.push_str(hint);
    }
    prompt
}
