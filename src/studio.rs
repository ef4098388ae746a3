//! The studio workflow: one handler per user action.
//!
//! Every handler takes the caller's [`SessionHistory`] explicitly; nothing here
//! keeps per-user state. A Generate action is a straight pipeline:
//! assemble, (optionally) enhance, generate, record.

use std::path::PathBuf;

use chrono::Local;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::info;

use crate::config::StudioConfig;
use crate::constants::{TIMESTAMP_FORMAT, VARIATION_COUNT};
use crate::enhancer::{OpenAiEnhancer, PromptEnhancer};
use crate::error::StudioError;
use crate::generator::{ImageBackend, ImageParams, StabilityClient};
use crate::history::{GenerationResult, SessionHistory};
use crate::prompt::{apply_weights, assemble};
use crate::request::GenerationRequest;
use crate::variations::{VariationRequest, build_variations, random_variation_seed};

/// A user action, as submitted by the front end.
#[derive(Clone, Debug)]
pub enum Action {
    /// Build, optionally enhance and render a new prompt
    Generate(GenerationRequest),
    /// Upscale a past image
    Upscale(usize),
    /// Build a variation loop from a past entry
    BuildVariations(usize),
    /// Download a past image
    Download(usize),
    /// Load a past prompt back into the form
    Regenerate(usize),
    /// Show a past prompt for copying
    Share(usize),
}

/// What an [`Action`] produced, ready to be rendered.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// A new image, already appended to history
    Generated(GenerateOutcome),
    /// The (unchanged) image for an upscale request
    Upscaled(Vec<u8>),
    /// A finished variation loop
    Variations(VariationOutcome),
    /// A file to hand to the browser
    Download(Download),
    /// The prompt to put back into the form
    Regenerate(String),
    /// The prompt to display for sharing
    Share(String),
}

/// Result of a Generate action.
#[derive(Clone, Debug)]
pub struct GenerateOutcome {
    /// The entry that was appended to history
    pub result: GenerationResult,
    /// Whether the prompt went through enhancement
    pub enhanced: bool,
    /// `generated_<timestamp>.png`
    pub download_filename: String,
}

/// Result of a Build Variations action.
#[derive(Clone, Debug)]
pub struct VariationOutcome {
    /// Where the GIF was written
    pub path: PathBuf,
    /// File name part of `path`
    pub filename: String,
    /// Prompt the frames were generated from
    pub prompt: String,
}

/// A downloadable file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Download {
    /// Suggested file name
    pub filename: String,
    /// MIME type
    pub mime: &'static str,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Settings that are not part of either upstream client.
#[derive(Clone, Debug)]
pub struct StudioSettings {
    /// Frames per variation loop
    pub variation_count: usize,
    /// Directory variation loops are written to
    pub variation_dir: PathBuf,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            variation_count: VARIATION_COUNT,
            variation_dir: std::env::temp_dir(),
        }
    }
}

/// Owns the upstream clients and runs user actions against a session's history.
#[derive(Clone, Debug)]
pub struct Studio<E = OpenAiEnhancer, B = StabilityClient> {
    enhancer: E,
    backend: B,
    settings: StudioSettings,
}

impl Studio {
    /// Builds the production studio from validated configuration.
    pub fn from_config(config: &StudioConfig) -> Self {
        let client = reqwest::Client::new();
        let enhancer = OpenAiEnhancer::new(
            client.clone(),
            config.chat_endpoint.clone(),
            config.openai_api_key.clone(),
            config.chat_model.clone(),
        );
        let backend = StabilityClient::new(
            client,
            config.image_endpoint.clone(),
            config.stability_api_key.clone(),
            config.image_model.clone(),
        );
        Self::new(
            enhancer,
            backend,
            StudioSettings {
                variation_count: VARIATION_COUNT,
                variation_dir: config.variation_dir.clone(),
            },
        )
    }
}

impl<E, B> Studio<E, B>
where
    E: PromptEnhancer + Sync,
    B: ImageBackend + Sync,
{
    /// Wires a studio from its parts.
    pub fn new(enhancer: E, backend: B, settings: StudioSettings) -> Self {
        Self {
            enhancer,
            backend,
            settings,
        }
    }

    /// Studio settings.
    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    /// Runs any action through its handler.
    pub async fn dispatch(
        &self,
        history: &mut SessionHistory,
        action: Action,
    ) -> Result<Outcome, StudioError> {
        match action {
            Action::Generate(request) => self.generate(history, &request).await.map(Outcome::Generated),
            Action::Upscale(id) => self.upscale(history, id).map(Outcome::Upscaled),
            Action::BuildVariations(id) => self
                .build_variations(history, id)
                .await
                .map(Outcome::Variations),
            Action::Download(id) => self.download(history, id).map(Outcome::Download),
            Action::Regenerate(id) => self.regenerate(history, id).map(Outcome::Regenerate),
            Action::Share(id) => self.share(history, id).map(Outcome::Share),
        }
    }

    /// Assembles the prompt, enhances it when asked, generates the image and
    /// appends the result to `history`.
    ///
    /// Nothing is appended when enhancement or generation fails, and a failed
    /// enhancement means the image service is never called.
    pub async fn generate(
        &self,
        history: &mut SessionHistory,
        request: &GenerationRequest,
    ) -> Result<GenerateOutcome, StudioError> {
        let seed = request.seed().resolve();
        let assembled = assemble(request.raw_prompt(), request.style());
        let mut final_prompt = apply_weights(assembled, request.use_weights());

        let enhanced = request.use_enhancement();
        if enhanced {
            final_prompt = self.enhancer.enhance(&final_prompt, request.style()).await?;
            info!("Prompt enhanced");
        }

        let image_bytes = self
            .backend
            .generate(&ImageParams {
                prompt: &final_prompt,
                steps: request.steps(),
                seed,
                aspect_ratio: request.aspect_ratio(),
                negative_prompt: request.negative_prompt(),
            })
            .await?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let result = history
            .append(GenerationResult {
                id: 0,
                prompt: final_prompt,
                image_bytes,
                timestamp: timestamp.clone(),
                seed,
                steps: request.steps(),
                aspect_ratio: request.aspect_ratio(),
                negative_prompt: request.negative_prompt().map(str::to_owned),
            })
            .clone();
        info!(id = result.id, seed, timestamp = %timestamp, "Generated image");

        Ok(GenerateOutcome {
            result,
            enhanced,
            download_filename: format!("generated_{timestamp}.png"),
        })
    }

    /// Upscaling is not implemented upstream; the stored image comes back as-is.
    pub fn upscale(&self, history: &SessionHistory, id: usize) -> Result<Vec<u8>, StudioError> {
        Ok(entry(history, id)?.image_bytes.clone())
    }

    /// Renders a variation loop from a past entry's prompt and parameters.
    pub async fn build_variations(
        &self,
        history: &SessionHistory,
        id: usize,
    ) -> Result<VariationOutcome, StudioError> {
        let base = entry(history, id)?;
        let filename = variation_filename(&base.timestamp);
        let output_path = self.settings.variation_dir.join(&filename);
        let request = VariationRequest {
            base_prompt: &base.prompt,
            steps: base.steps,
            aspect_ratio: base.aspect_ratio,
            negative_prompt: base.negative_prompt.as_deref(),
            count: self.settings.variation_count,
        };
        let path = build_variations(&self.backend, &request, &output_path, random_variation_seed)
            .await?;
        Ok(VariationOutcome {
            path,
            filename,
            prompt: base.prompt.clone(),
        })
    }

    /// The stored PNG for a gallery download.
    pub fn download(&self, history: &SessionHistory, id: usize) -> Result<Download, StudioError> {
        let entry = entry(history, id)?;
        Ok(Download {
            filename: entry.download_filename(),
            mime: "image/png",
            bytes: entry.image_bytes.clone(),
        })
    }

    /// The prompt to load back into the form.
    pub fn regenerate(&self, history: &SessionHistory, id: usize) -> Result<String, StudioError> {
        Ok(entry(history, id)?.prompt.clone())
    }

    /// The prompt to display for copying.
    pub fn share(&self, history: &SessionHistory, id: usize) -> Result<String, StudioError> {
        Ok(entry(history, id)?.prompt.clone())
    }
}

fn entry(history: &SessionHistory, id: usize) -> Result<&GenerationResult, StudioError> {
    history
        .get(id)
        .ok_or_else(|| StudioError::NotFound(format!("history entry {id}")))
}

/// `variation_loop_<timestamp>_<random>.gif`, unique per build.
fn variation_filename(timestamp: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("variation_loop_{timestamp}_{suffix}.gif")
}

/// True for names produced by [`Studio::build_variations`].
pub fn is_variation_filename(name: &str) -> bool {
    name.starts_with("variation_loop_")
        && name.ends_with(".gif")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !name.contains("..")
}
