use clap::Parser;
use studio::config::{StudioConfig, setup_logging};
use studio::constants::MISSING_KEYS_MESSAGE;
use studio::error::StudioError;
use studio::studio::Studio;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = studio::cli::CliOptions::parse();

    if let Err(err) = setup_logging(cli.debug) {
        eprintln!("Logging setup error: {}", err);
    }

    let config = match StudioConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(StudioError::ConfigurationMissing(missing)) => {
            error!("{} Missing: {}", MISSING_KEYS_MESSAGE, missing.join(", "));
            std::process::exit(1);
        }
        Err(err) => {
            error!("Configuration error: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = studio::web::setup_server(
        &cli.listen_address,
        cli.port,
        Studio::from_config(&config),
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
