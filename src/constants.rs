//! Shared constants for the studio
//!

/// Default chat-completion endpoint used for prompt enhancement.
pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default image-synthesis endpoint.
pub const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://api.stability.ai/v2beta/stable-image/generate/core";

/// Default chat model used for prompt enhancement.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";

/// Default image model identifier sent with every generation.
pub const DEFAULT_IMAGE_MODEL: &str = "stable-diffusion-xl-1024-v1-0";

/// Output format requested from the image service.
pub const OUTPUT_FORMAT: &str = "png";

/// Instruction template for prompt enhancement, `{style}` and `{prompt}` are filled in.
pub const ENHANCE_TEMPLATE: &str =
    "Enhance the following prompt for an AI image generator. Style: {style}. Prompt: {prompt}";

/// Inclusive step bounds accepted by the form.
pub const MIN_STEPS: u8 = 10;
/// Upper bound for steps.
pub const MAX_STEPS: u8 = 50;
/// Default number of steps.
pub const DEFAULT_STEPS: u8 = 30;

/// Largest seed drawn (or accepted) for a single generation.
pub const MAX_SEED: u32 = 999_999_999;

/// Largest seed drawn for a variation frame.
pub const MAX_VARIATION_SEED: u32 = 999_999;

/// Seed offered in the form when fixed seeds are selected.
pub const DEFAULT_FIXED_SEED: u32 = 42;

/// Number of frames in a variation loop.
pub const VARIATION_COUNT: usize = 5;

/// Per-frame delay of the variation loop, in milliseconds.
pub const VARIATION_FRAME_MS: u32 = 300;

/// How many history entries the gallery shows.
pub const GALLERY_SIZE: usize = 5;

/// Timestamp format used for history entries and download names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Message shown when the API keys are missing.
pub const MISSING_KEYS_MESSAGE: &str = "API keys are not set. Please set OPENAI_API_KEY and STABILITY_API_KEY in your environment.";

/// Session inactivity expiry, in minutes.
pub const SESSION_EXPIRY_MINUTES: i64 = 60;

/// How often expired sessions are purged from the store, in seconds.
pub const SESSION_PURGE_INTERVAL_SECS: u64 = 60;
