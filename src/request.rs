//! The validated inputs of a single Generate action.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_SEED, MAX_STEPS, MIN_STEPS};
use crate::error::StudioError;

/// Style tag appended to the prompt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Style {
    /// No suffix
    #[default]
    None,
    /// "anime style"
    Anime,
    /// "photorealistic"
    Photorealistic,
    /// "cyberpunk"
    Cyberpunk,
    /// "fantasy art"
    FantasyArt,
    /// "pixel art"
    PixelArt,
}

impl Style {
    /// Every style in the order the selector lists them.
    pub const ALL: [Style; 6] = [
        Style::None,
        Style::Anime,
        Style::Photorealistic,
        Style::Cyberpunk,
        Style::FantasyArt,
        Style::PixelArt,
    ];

    /// The text used both in the selector and as the prompt suffix.
    pub fn label(self) -> &'static str {
        match self {
            Style::None => "None",
            Style::Anime => "anime style",
            Style::Photorealistic => "photorealistic",
            Style::Cyberpunk => "cyberpunk",
            Style::FantasyArt => "fantasy art",
            Style::PixelArt => "pixel art",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| StudioError::InvalidInput(format!("unknown style {value:?}")))
    }
}

/// Output aspect ratio understood by the image service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[default]
    Square,
    /// 16:9
    Widescreen,
    /// 9:16
    Portrait,
    /// 4:3
    Standard,
    /// 3:2
    Photo,
}

impl AspectRatio {
    /// Every ratio in selector order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Portrait,
        AspectRatio::Standard,
        AspectRatio::Photo,
    ];

    /// Wire value, eg `16:9`.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Photo => "3:2",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == value.trim())
            .ok_or_else(|| StudioError::InvalidInput(format!("unknown aspect ratio {value:?}")))
    }
}

/// How the seed for a generation is chosen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeedChoice {
    /// Draw a fresh seed in `0..=MAX_SEED` for every generation
    Random,
    /// Use exactly this seed
    Fixed(u32),
}

impl SeedChoice {
    /// Turns the choice into the seed that is actually sent.
    pub fn resolve(self) -> u32 {
        match self {
            SeedChoice::Random => rand::rng().random_range(0..=MAX_SEED),
            SeedChoice::Fixed(seed) => seed,
        }
    }
}

/// Everything a Generate action needs, validated once when built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenerationRequest {
    raw_prompt: String,
    style: Style,
    use_weights: bool,
    use_enhancement: bool,
    negative_prompt: Option<String>,
    steps: u8,
    seed: SeedChoice,
    aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Validates and builds a request.
    ///
    /// A blank prompt is rejected, as are steps outside `MIN_STEPS..=MAX_STEPS`
    /// and fixed seeds above `MAX_SEED`. An empty negative prompt is dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        raw_prompt: impl Into<String>,
        style: Style,
        use_weights: bool,
        use_enhancement: bool,
        negative_prompt: Option<String>,
        steps: u8,
        seed: SeedChoice,
        aspect_ratio: AspectRatio,
    ) -> Result<Self, StudioError> {
        let raw_prompt = raw_prompt.into();
        if raw_prompt.trim().is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        if !(MIN_STEPS..=MAX_STEPS).contains(&steps) {
            return Err(StudioError::InvalidInput(format!(
                "steps must be between {MIN_STEPS} and {MAX_STEPS}, got {steps}"
            )));
        }
        if let SeedChoice::Fixed(seed) = seed
            && seed > MAX_SEED
        {
            return Err(StudioError::InvalidInput(format!(
                "seed must be at most {MAX_SEED}, got {seed}"
            )));
        }
        let negative_prompt = negative_prompt.filter(|value| !value.trim().is_empty());
        Ok(Self {
            raw_prompt,
            style,
            use_weights,
            use_enhancement,
            negative_prompt,
            steps,
            seed,
            aspect_ratio,
        })
    }

    /// The prompt as typed.
    pub fn raw_prompt(&self) -> &str {
        &self.raw_prompt
    }

    /// Selected style.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether the weighted syntax toggle was on.
    pub fn use_weights(&self) -> bool {
        self.use_weights
    }

    /// Whether the prompt is rewritten before generation.
    pub fn use_enhancement(&self) -> bool {
        self.use_enhancement
    }

    /// Negative prompt, never empty when present.
    pub fn negative_prompt(&self) -> Option<&str> {
        self.negative_prompt.as_deref()
    }

    /// Sampling steps.
    pub fn steps(&self) -> u8 {
        self.steps
    }

    /// Seed mode.
    pub fn seed(&self) -> SeedChoice {
        self.seed
    }

    /// Requested aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }
}
