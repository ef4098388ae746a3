use super::prelude::*;
use super::session::FormState;
use crate::constants::{GALLERY_SIZE, MAX_SEED, MAX_STEPS, MIN_STEPS};
use crate::history::{GenerationResult, SessionHistory};
use crate::request::{AspectRatio, Style};
use crate::studio::GenerateOutcome;

#[derive(Clone, Debug)]
pub(crate) struct SelectOption {
    pub(crate) value: String,
    pub(crate) selected: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ResultView {
    pub(crate) id: usize,
    pub(crate) prompt: String,
    pub(crate) timestamp: String,
    pub(crate) seed: u32,
    pub(crate) aspect_ratio: String,
    pub(crate) enhanced: bool,
    pub(crate) download_filename: String,
}

impl From<&GenerateOutcome> for ResultView {
    fn from(outcome: &GenerateOutcome) -> Self {
        Self {
            id: outcome.result.id,
            prompt: outcome.result.prompt.clone(),
            timestamp: outcome.result.timestamp.clone(),
            seed: outcome.result.seed,
            aspect_ratio: outcome.result.aspect_ratio.to_string(),
            enhanced: outcome.enhanced,
            download_filename: outcome.download_filename.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GalleryItem {
    pub(crate) id: usize,
    pub(crate) prompt: String,
    pub(crate) timestamp: String,
    pub(crate) seed: u32,
}

impl From<&GenerationResult> for GalleryItem {
    fn from(entry: &GenerationResult) -> Self {
        Self {
            id: entry.id,
            prompt: entry.prompt.clone(),
            timestamp: entry.timestamp.clone(),
            seed: entry.seed,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "studio.html")]
pub(crate) struct StudioTemplate {
    pub(crate) csrf_token: String,
    pub(crate) form: FormState,
    pub(crate) styles: Vec<SelectOption>,
    pub(crate) aspect_ratios: Vec<SelectOption>,
    pub(crate) min_steps: u8,
    pub(crate) max_steps: u8,
    pub(crate) max_seed: u32,
    pub(crate) result: Option<ResultView>,
    pub(crate) error_message: Option<String>,
    pub(crate) gallery: Vec<GalleryItem>,
    pub(crate) share_options: Vec<GalleryItem>,
    pub(crate) has_flash: bool,
    pub(crate) flash_message: String,
    pub(crate) flash_class: String,
}

impl StudioTemplate {
    pub(crate) fn new(
        csrf_token: String,
        form: FormState,
        history: &SessionHistory,
        flash: Option<flash::FlashMessage>,
    ) -> Self {
        let styles = Style::ALL
            .into_iter()
            .map(|style| SelectOption {
                value: style.label().to_string(),
                selected: style == form.style,
            })
            .collect();
        let aspect_ratios = AspectRatio::ALL
            .into_iter()
            .map(|ratio| SelectOption {
                value: ratio.as_str().to_string(),
                selected: ratio == form.aspect_ratio,
            })
            .collect();
        let (has_flash, flash_message, flash_class) = match flash {
            Some(message) => (true, message.text.to_string(), message.class.to_string()),
            None => (false, String::new(), String::new()),
        };
        Self {
            csrf_token,
            form,
            styles,
            aspect_ratios,
            min_steps: MIN_STEPS,
            max_steps: MAX_STEPS,
            max_seed: MAX_SEED,
            result: None,
            error_message: None,
            gallery: history
                .list_recent(GALLERY_SIZE)
                .into_iter()
                .map(GalleryItem::from)
                .collect(),
            share_options: history.entries().iter().map(GalleryItem::from).collect(),
            has_flash,
            flash_message,
            flash_class,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "upscale.html")]
pub(crate) struct UpscaleTemplate {
    pub(crate) image_data_uri: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "variations.html")]
pub(crate) struct VariationsTemplate {
    pub(crate) prompt: String,
    pub(crate) filename: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "share.html")]
pub(crate) struct ShareTemplate {
    pub(crate) prompt: String,
}
