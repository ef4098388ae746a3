//! Config handling

use std::path::PathBuf;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::error::StudioError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("tower_sessions", LevelFilter::Warn)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Validated runtime configuration for the studio.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// Chat-completion credential
    pub openai_api_key: String,
    /// Image service credential
    pub stability_api_key: String,
    /// Chat model for enhancement
    pub chat_model: String,
    /// Image model identifier
    pub image_model: String,
    /// Chat-completion endpoint
    pub chat_endpoint: Url,
    /// Image-generation endpoint
    pub image_endpoint: Url,
    /// Where variation loops are written
    pub variation_dir: PathBuf,
}

impl StudioConfig {
    /// Checks that both credentials are present; nothing runs without them.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, StudioError> {
        let (openai_api_key, stability_api_key) =
            require_keys(cli.openai_api_key.as_deref(), cli.stability_api_key.as_deref())?;
        Ok(Self {
            openai_api_key,
            stability_api_key,
            chat_model: cli.chat_model.clone(),
            image_model: cli.image_model.clone(),
            chat_endpoint: cli.chat_endpoint.clone(),
            image_endpoint: cli.image_endpoint.clone(),
            variation_dir: cli
                .variation_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
        })
    }
}

/// Returns both keys, or every missing key name. Blank values count as missing.
pub fn require_keys(
    openai_api_key: Option<&str>,
    stability_api_key: Option<&str>,
) -> Result<(String, String), StudioError> {
    let openai = openai_api_key.map(str::trim).filter(|key| !key.is_empty());
    let stability = stability_api_key.map(str::trim).filter(|key| !key.is_empty());
    match (openai, stability) {
        (Some(openai), Some(stability)) => Ok((openai.to_string(), stability.to_string())),
        (openai, stability) => {
            let mut missing = Vec::new();
            if openai.is_none() {
                missing.push("OPENAI_API_KEY");
            }
            if stability.is_none() {
                missing.push("STABILITY_API_KEY");
            }
            Err(StudioError::ConfigurationMissing(missing))
        }
    }
}
