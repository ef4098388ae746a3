//! Prompt enhancement through an OpenAI-compatible chat-completion endpoint.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::constants::ENHANCE_TEMPLATE;
use crate::error::StudioError;
use crate::request::Style;

/// Rewrites a prompt before it is sent to the image service.
pub trait PromptEnhancer {
    /// Returns the rewritten prompt; any failure is [`StudioError::EnhancementFailed`].
    fn enhance(
        &self,
        prompt: &str,
        style: Style,
    ) -> impl Future<Output = Result<String, StudioError>> + Send;
}

/// Fills the instruction template.
pub fn enhancement_instruction(prompt: &str, style: Style) -> String {
    ENHANCE_TEMPLATE
        .replace("{style}", style.label())
        .replace("{prompt}", prompt)
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client used for enhancement.
#[derive(Clone, Debug)]
pub struct OpenAiEnhancer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiEnhancer {
    /// Builds a client for the given endpoint, key and model.
    pub fn new(client: reqwest::Client, endpoint: Url, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }
}

impl PromptEnhancer for OpenAiEnhancer {
    async fn enhance(&self, prompt: &str, style: Style) -> Result<String, StudioError> {
        let instruction = enhancement_instruction(prompt, style);
        let req_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &instruction,
            }],
        };
        debug!(model = %self.model, "Requesting prompt enhancement");

        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()
            .await
            .map_err(|err| StudioError::EnhancementFailed(err.to_string()))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| StudioError::EnhancementFailed(err.to_string()))?;
        if !status.is_success() {
            return Err(StudioError::EnhancementFailed(format!(
                "chat completion error {status}: {}",
                String::from_utf8_lossy(&bytes)
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|err| {
            StudioError::EnhancementFailed(format!("failed to parse chat completion: {err}"))
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                StudioError::EnhancementFailed("chat completion returned no content".to_string())
            })
    }
}
