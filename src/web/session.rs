//! Per-user studio state kept in the cookie session.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::constants::{DEFAULT_FIXED_SEED, DEFAULT_STEPS};
use crate::error::StudioError;
use crate::history::SessionHistory;
use crate::request::{AspectRatio, Style};

const HISTORY_KEY: &str = "history";
const FORM_KEY: &str = "form";
const VARIATIONS_KEY: &str = "variations";

/// The form as the user last left it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct FormState {
    pub(crate) prompt: String,
    pub(crate) use_weights: bool,
    pub(crate) use_enhancement: bool,
    pub(crate) style: Style,
    pub(crate) negative_prompt: String,
    pub(crate) steps: u8,
    pub(crate) fixed_seed_mode: bool,
    pub(crate) fixed_seed: u32,
    pub(crate) aspect_ratio: AspectRatio,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            use_weights: false,
            use_enhancement: true,
            style: Style::None,
            negative_prompt: String::new(),
            steps: DEFAULT_STEPS,
            fixed_seed_mode: false,
            fixed_seed: DEFAULT_FIXED_SEED,
            aspect_ratio: AspectRatio::Square,
        }
    }
}

pub(crate) async fn load_history(session: &Session) -> Result<SessionHistory, StudioError> {
    Ok(session
        .get::<SessionHistory>(HISTORY_KEY)
        .await?
        .unwrap_or_default())
}

pub(crate) async fn save_history(
    session: &Session,
    history: &SessionHistory,
) -> Result<(), StudioError> {
    session.insert(HISTORY_KEY, history).await?;
    Ok(())
}

pub(crate) async fn load_form(session: &Session) -> Result<FormState, StudioError> {
    Ok(session.get::<FormState>(FORM_KEY).await?.unwrap_or_default())
}

pub(crate) async fn save_form(session: &Session, form: &FormState) -> Result<(), StudioError> {
    session.insert(FORM_KEY, form).await?;
    Ok(())
}

/// Records a variation loop this session is allowed to download.
pub(crate) async fn remember_variation(
    session: &Session,
    filename: &str,
) -> Result<(), StudioError> {
    let mut known = session
        .get::<Vec<String>>(VARIATIONS_KEY)
        .await?
        .unwrap_or_default();
    known.push(filename.to_string());
    session.insert(VARIATIONS_KEY, known).await?;
    Ok(())
}

pub(crate) async fn owns_variation(session: &Session, filename: &str) -> Result<bool, StudioError> {
    Ok(session
        .get::<Vec<String>>(VARIATIONS_KEY)
        .await?
        .unwrap_or_default()
        .iter()
        .any(|known| known == filename))
}
