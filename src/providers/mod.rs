pub mod image_client;
pub mod text_client;

use crate::{
    config::{Config, TextProvider},
    error::{RelayError, Result},
    models::{
        ImageGenerationRequest, ImageGenerationResponse, ProviderErrorEnvelope,
        TextGenerationRequest,
    },
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

pub use image_client::TogetherImageClient;
pub use text_client::{GeminiTextClient, OpenAiTextClient};

/// Free-form text completion: prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &TextGenerationRequest) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Text-to-image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse>;

    fn name(&self) -> &'static str;
}

/// The two downstream clients, built once and shared across requests.
#[derive(Clone)]
pub struct ProviderClients {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
}

impl ProviderClients {
    pub fn new(text: Arc<dyn TextGenerator>, image: Arc<dyn ImageGenerator>) -> Self {
        Self { text, image }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(config.http_timeout_secs)?;

        let text: Arc<dyn TextGenerator> = match config.text.provider {
            TextProvider::OpenAi => Arc::new(OpenAiTextClient::new(http.clone(), &config.text)),
            TextProvider::Gemini => Arc::new(GeminiTextClient::new(http.clone(), &config.text)),
        };
        let image: Arc<dyn ImageGenerator> =
            Arc::new(TogetherImageClient::new(http, &config.image));

        log::debug!(
            "Provider clients ready: text={}, image={}",
            text.name(),
            image.name()
        );

        Ok(Self { text, image })
    }

    pub fn text(&self) -> &Arc<dyn TextGenerator> {
        &self.text
    }

    pub fn image(&self) -> &Arc<dyn ImageGenerator> {
        &self.image
    }
}

fn build_http_client(timeout_secs: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| RelayError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Passes a successful response through, otherwise turns it into a
/// `ProviderError` carrying the provider's own message when it sent one.
pub(crate) async fn ensure_success(provider: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
        .ok()
        .and_then(ProviderErrorEnvelope::message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            }
        });

    log::error!("{} request failed with {}: {}", provider, status, message);

    Err(RelayError::ProviderError {
        provider,
        status: status.as_u16(),
        message,
    })
}
