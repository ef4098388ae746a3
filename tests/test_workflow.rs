use std::sync::Mutex;

use clap::Parser;
use studio::cli::CliOptions;
use studio::config::{StudioConfig, setup_logging};
use studio::enhancer::PromptEnhancer;
use studio::error::StudioError;
use studio::generator::{ImageBackend, ImageParams};
use studio::history::SessionHistory;
use studio::request::{AspectRatio, GenerationRequest, SeedChoice, Style};
use studio::studio::{Studio, StudioSettings};

struct EchoEnhancer;

impl PromptEnhancer for EchoEnhancer {
    async fn enhance(&self, prompt: &str, _style: Style) -> Result<String, StudioError> {
        Ok(format!("{prompt}, highly detailed"))
    }
}

struct ScriptedBackend {
    statuses: Mutex<Vec<u16>>,
    seen: Mutex<Vec<(String, u32)>>,
}

impl ScriptedBackend {
    fn new(statuses: Vec<u16>) -> Self {
        Self {
            statuses: Mutex::new(statuses),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl ImageBackend for ScriptedBackend {
    async fn generate(&self, params: &ImageParams<'_>) -> Result<Vec<u8>, StudioError> {
        self.seen
            .lock()
            .expect("lock seen")
            .push((params.prompt.to_string(), params.seed));
        let status = self.statuses.lock().expect("lock statuses").remove(0);
        if status == 200 {
            Ok(format!("image-{}", params.seed).into_bytes())
        } else {
            Err(StudioError::GenerationFailed {
                status,
                body: "nope".to_string(),
            })
        }
    }
}

fn forest(seed: SeedChoice, enhance: bool) -> GenerationRequest {
    GenerationRequest::new(
        "a mystical forest",
        Style::FantasyArt,
        true,
        enhance,
        None,
        25,
        seed,
        AspectRatio::Portrait,
    )
    .expect("valid request")
}

#[test]
fn cli_keys_build_a_config() {
    let _ = setup_logging(true);
    let cli = CliOptions::try_parse_from([
        "studio",
        "--openai-api-key",
        "sk-openai",
        "--stability-api-key",
        "sk-stability",
        "--image-endpoint",
        "http://localhost:8080/generate",
        "--variation-dir",
        "/tmp/loops",
    ])
    .expect("parse cli");
    let config = StudioConfig::from_cli(&cli).expect("config");
    assert_eq!(config.openai_api_key, "sk-openai");
    assert_eq!(config.stability_api_key, "sk-stability");
    assert_eq!(config.image_endpoint.as_str(), "http://localhost:8080/generate");
    assert_eq!(config.variation_dir, std::path::PathBuf::from("/tmp/loops"));
}

#[test]
fn blank_cli_keys_are_missing_configuration() {
    let cli = CliOptions::try_parse_from([
        "studio",
        "--openai-api-key",
        "",
        "--stability-api-key",
        " ",
    ])
    .expect("parse cli");
    assert!(matches!(
        StudioConfig::from_cli(&cli),
        Err(StudioError::ConfigurationMissing(_))
    ));
}

#[tokio::test]
async fn history_grows_only_on_success() {
    let studio = Studio::new(
        EchoEnhancer,
        ScriptedBackend::new(vec![200, 429, 200]),
        StudioSettings::default(),
    );
    let mut history = SessionHistory::new();

    let first = studio
        .generate(&mut history, &forest(SeedChoice::Fixed(42), false))
        .await
        .expect("first generation");
    assert_eq!(history.len(), 1);
    assert_eq!(first.result.image_bytes, b"image-42".to_vec());

    let err = studio
        .generate(&mut history, &forest(SeedChoice::Random, true))
        .await
        .expect_err("rate limited");
    assert!(matches!(err, StudioError::GenerationFailed { status: 429, .. }));
    assert_eq!(history.len(), 1);

    studio
        .generate(&mut history, &forest(SeedChoice::Fixed(7), true))
        .await
        .expect("third generation");
    assert_eq!(history.len(), 2);
    let last = history.last().expect("last entry");
    assert_eq!(last.prompt, "a mystical forest in fantasy art, highly detailed");
    assert_eq!(last.image_bytes, b"image-7".to_vec());
    assert_eq!(last.aspect_ratio, AspectRatio::Portrait);
    assert_eq!(last.steps, 25);
}
