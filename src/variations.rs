//! Variation loops: the same prompt rendered with several seeds, encoded as a looping GIF.

use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use rand::Rng;
use tracing::{debug, info};

use crate::constants::{MAX_VARIATION_SEED, VARIATION_FRAME_MS};
use crate::error::StudioError;
use crate::generator::{ImageBackend, ImageParams};
use crate::request::AspectRatio;

/// What a variation loop is built from.
#[derive(Clone, Copy, Debug)]
pub struct VariationRequest<'a> {
    /// Prompt shared by every frame
    pub base_prompt: &'a str,
    /// Sampling steps
    pub steps: u8,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Negative prompt, skipped when empty
    pub negative_prompt: Option<&'a str>,
    /// Number of frames
    pub count: usize,
}

/// Draws a seed for one variation frame.
pub fn random_variation_seed() -> u32 {
    rand::rng().random_range(0..=MAX_VARIATION_SEED)
}

/// Generates `count` images one after another, each with a seed from `next_seed`,
/// and writes them as an endlessly looping GIF to `output_path`.
///
/// The first failing frame aborts the loop and nothing is written.
pub async fn build_variations<B, S>(
    backend: &B,
    request: &VariationRequest<'_>,
    output_path: &Path,
    mut next_seed: S,
) -> Result<PathBuf, StudioError>
where
    B: ImageBackend,
    S: FnMut() -> u32,
{
    let mut frames = Vec::with_capacity(request.count);
    for idx in 0..request.count {
        let seed = next_seed();
        debug!(frame = idx, seed, "Generating variation frame");
        let bytes = backend
            .generate(&ImageParams {
                prompt: request.base_prompt,
                steps: request.steps,
                seed,
                aspect_ratio: request.aspect_ratio,
                negative_prompt: request.negative_prompt,
            })
            .await?;
        frames.push(bytes);
    }

    let frame_count = frames.len();
    let encoded = render_loop(frames, VARIATION_FRAME_MS).await?;
    tokio::fs::write(output_path, encoded).await?;
    info!(
        "Wrote variation loop with {} frames to {}",
        frame_count,
        output_path.display()
    );
    Ok(output_path.to_path_buf())
}

/// Decodes the raw frames and encodes the loop on the blocking pool.
pub async fn render_loop(frames: Vec<Vec<u8>>, frame_ms: u32) -> Result<Vec<u8>, StudioError> {
    tokio::task::spawn_blocking(move || -> Result<Vec<u8>, StudioError> {
        let decoded = frames
            .iter()
            .map(|bytes| image::load_from_memory(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        encode_loop(&decoded, frame_ms)
    })
    .await
    .map_err(|err| StudioError::InternalServerError(format!("variation encoder task failed: {err}")))?
}

/// Encodes the frames, in order, as an infinitely repeating GIF.
pub fn encode_loop(frames: &[DynamicImage], frame_ms: u32) -> Result<Vec<u8>, StudioError> {
    let mut output = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut output);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
        for frame in frames {
            let frame = Frame::from_parts(
                frame.to_rgba8(),
                0,
                0,
                Delay::from_numer_denom_ms(frame_ms, 1),
            );
            encoder
                .encode_frame(frame)
                .map_err(|err| StudioError::InternalServerError(err.to_string()))?;
        }
    }
    Ok(output)
}
