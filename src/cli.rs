//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;
use url::Url;

use crate::constants::{
    DEFAULT_CHAT_ENDPOINT, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_ENDPOINT, DEFAULT_IMAGE_MODEL,
};

#[derive(Parser, Debug)]
#[command(name = "studio", about = "Text-to-image studio")]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "STUDIO_DEBUG")]
    /// Enable debug logging. Env: STUDIO_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "9000", env = "STUDIO_PORT")]
    /// http listener, defaults to `9000`.
    /// Env: STUDIO_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "STUDIO_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: STUDIO_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    /// Credential for the chat-completion service. Env: OPENAI_API_KEY
    pub openai_api_key: Option<String>,
    #[clap(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    /// Credential for the image service. Env: STABILITY_API_KEY
    pub stability_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_CHAT_MODEL, env = "STUDIO_CHAT_MODEL")]
    /// Chat model used for prompt enhancement. Env: STUDIO_CHAT_MODEL
    pub chat_model: String,
    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "STUDIO_IMAGE_MODEL")]
    /// Image model identifier. Env: STUDIO_IMAGE_MODEL
    pub image_model: String,
    #[clap(long, default_value = DEFAULT_CHAT_ENDPOINT, env = "STUDIO_CHAT_ENDPOINT")]
    /// Chat-completion endpoint. Env: STUDIO_CHAT_ENDPOINT
    pub chat_endpoint: Url,
    #[clap(long, default_value = DEFAULT_IMAGE_ENDPOINT, env = "STUDIO_IMAGE_ENDPOINT")]
    /// Image-generation endpoint. Env: STUDIO_IMAGE_ENDPOINT
    pub image_endpoint: Url,

    #[clap(long, env = "STUDIO_VARIATION_DIR")]
    /// Where variation loops are written, defaults to the system temp dir.
    /// Env: STUDIO_VARIATION_DIR
    pub variation_dir: Option<PathBuf>,
}
