//! Image generation against the remote image-synthesis service.

use std::future::Future;

use reqwest::multipart::Form;
use tracing::{debug, error};
use url::Url;

use crate::constants::OUTPUT_FORMAT;
use crate::error::StudioError;
use crate::request::AspectRatio;

/// Parameters of one image-generation call.
#[derive(Clone, Copy, Debug)]
pub struct ImageParams<'a> {
    /// Final prompt, after assembly and enhancement
    pub prompt: &'a str,
    /// Sampling steps
    pub steps: u8,
    /// Seed actually sent
    pub seed: u32,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Things to keep out of the image; skipped when empty
    pub negative_prompt: Option<&'a str>,
}

/// Something that turns a prompt into image bytes.
pub trait ImageBackend {
    /// Generates one image. Only HTTP 200 counts as success.
    fn generate(
        &self,
        params: &ImageParams<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, StudioError>> + Send;
}

/// Client for the Stability `generate/core` endpoint.
#[derive(Clone, Debug)]
pub struct StabilityClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl StabilityClient {
    /// Builds a client for the given endpoint, key and model identifier.
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }

    fn form(&self, params: &ImageParams<'_>) -> Form {
        let mut form = Form::new()
            .text("prompt", params.prompt.to_string())
            .text("model", self.model.clone())
            .text("output_format", OUTPUT_FORMAT)
            .text("aspect_ratio", params.aspect_ratio.as_str())
            .text("seed", params.seed.to_string())
            .text("steps", params.steps.to_string());
        if let Some(negative_prompt) = params
            .negative_prompt
            .filter(|value| !value.is_empty())
        {
            form = form.text("negative_prompt", negative_prompt.to_string());
        }
        form
    }
}

impl ImageBackend for StabilityClient {
    async fn generate(&self, params: &ImageParams<'_>) -> Result<Vec<u8>, StudioError> {
        debug!(
            seed = params.seed,
            steps = params.steps,
            aspect_ratio = %params.aspect_ratio,
            "Requesting image"
        );
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "image/*")
            .multipart(self.form(params))
            .send()
            .await
            .map_err(|err| StudioError::Transport(err.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| StudioError::Transport(err.to_string()))?;
        if status != reqwest::StatusCode::OK {
            let body = String::from_utf8_lossy(&bytes).to_string();
            error!("Image generation failed: {} - {}", status.as_u16(), body);
            return Err(StudioError::GenerationFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeUpstream, png_bytes, spawn_upstream};

    async fn client_for(upstream: FakeUpstream) -> StabilityClient {
        let base = spawn_upstream(upstream).await;
        let endpoint =
            Url::parse(&format!("{base}/v2beta/stable-image/generate/core")).expect("endpoint url");
        StabilityClient::new(
            reqwest::Client::new(),
            endpoint,
            "sk-stability".to_string(),
            "stable-diffusion-xl-1024-v1-0".to_string(),
        )
    }

    #[tokio::test]
    async fn sends_every_field_and_returns_body() {
        let upstream = FakeUpstream::ok();
        let client = client_for(upstream.clone()).await;
        let params = ImageParams {
            prompt: "a mystical forest in fantasy art",
            steps: 30,
            seed: 42,
            aspect_ratio: AspectRatio::Widescreen,
            negative_prompt: Some("blurry, watermark"),
        };

        let bytes = client.generate(&params).await.expect("generate");
        assert_eq!(bytes, png_bytes(8, 8, 200));

        let requests = upstream.image_requests();
        assert_eq!(requests.len(), 1);
        let form = &requests[0];
        assert_eq!(form.field("prompt"), Some("a mystical forest in fantasy art"));
        assert_eq!(form.field("model"), Some("stable-diffusion-xl-1024-v1-0"));
        assert_eq!(form.field("output_format"), Some("png"));
        assert_eq!(form.field("aspect_ratio"), Some("16:9"));
        assert_eq!(form.field("seed"), Some("42"));
        assert_eq!(form.field("steps"), Some("30"));
        assert_eq!(form.field("negative_prompt"), Some("blurry, watermark"));
        assert_eq!(form.authorization.as_deref(), Some("Bearer sk-stability"));
        assert_eq!(form.accept.as_deref(), Some("image/*"));
    }

    #[tokio::test]
    async fn empty_negative_prompt_is_not_sent() {
        let upstream = FakeUpstream::ok();
        let client = client_for(upstream.clone()).await;
        let params = ImageParams {
            prompt: "a lighthouse",
            steps: 10,
            seed: 7,
            aspect_ratio: AspectRatio::Square,
            negative_prompt: Some(""),
        };
        client.generate(&params).await.expect("generate");
        let requests = upstream.image_requests();
        assert_eq!(requests[0].field("negative_prompt"), None);
    }

    #[tokio::test]
    async fn non_200_is_generation_failed() {
        let upstream = FakeUpstream {
            image_status: 429,
            ..FakeUpstream::ok()
        };
        let client = client_for(upstream).await;
        let params = ImageParams {
            prompt: "a lighthouse",
            steps: 30,
            seed: 1,
            aspect_ratio: AspectRatio::Square,
            negative_prompt: None,
        };
        match client.generate(&params).await {
            Err(StudioError::GenerationFailed { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("upstream said no"));
            }
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }
}
