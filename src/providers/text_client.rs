use crate::{
    config::TextProviderConfig,
    error::{RelayError, Result},
    models::{
        GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiRequest, GeminiResponse,
        OpenAiChatRequest, OpenAiChatResponse, OpenAiMessage, TextGenerationRequest,
    },
    providers::{ensure_success, TextGenerator},
};
use async_trait::async_trait;
use reqwest::Client;

const OPENAI: &str = "OpenAI";
const GEMINI: &str = "Gemini";

#[derive(Clone)]
pub struct OpenAiTextClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiTextClient {
    pub fn new(client: Client, config: &TextProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextClient {
    async fn generate(&self, request: &TextGenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::ConfigError("OPENAI_API_KEY is not set".into()))?;

        let payload = OpenAiChatRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            max_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
            temperature: Some(request.temperature.unwrap_or(self.temperature)),
        };

        log::info!("Invoking text model: {} ({})", self.model, OPENAI);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(OPENAI, response).await?;

        let completion: OpenAiChatResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::ResponseError("OpenAI returned no choices".into()))?;

        if let Some(reason) = &choice.finish_reason {
            log::debug!("OpenAI finish reason: {}", reason);
        }

        choice
            .message
            .content
            .ok_or_else(|| RelayError::ResponseError("OpenAI returned an empty message".into()))
    }

    fn name(&self) -> &'static str {
        OPENAI
    }
}

#[derive(Clone)]
pub struct GeminiTextClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiTextClient {
    pub fn new(client: Client, config: &TextProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiTextClient {
    async fn generate(&self, request: &TextGenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::ConfigError("GEMINI_API_KEY is not set".into()))?;

        let payload = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(request.max_tokens.unwrap_or(self.max_tokens)),
                temperature: Some(request.temperature.unwrap_or(self.temperature)),
            }),
        };

        log::info!("Invoking text model: {} ({})", self.model, GEMINI);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(GEMINI, response).await?;

        let reply: GeminiResponse = response.json().await?;
        if let Some(reason) = reply
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            log::debug!("Gemini finish reason: {}", reason);
        }

        reply
            .text()
            .ok_or_else(|| RelayError::ResponseError("Gemini returned no candidates".into()))
    }

    fn name(&self) -> &'static str {
        GEMINI
    }
}
