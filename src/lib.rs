//! Prompt-to-image relay: optional LLM prompt enhancement (OpenAI or Gemini)
//! followed by a single Together AI image generation call.

pub mod config;
pub mod enhance;
pub mod error;
pub mod logger;
pub mod models;
pub mod providers;
pub mod relay;
pub mod storage;

#[cfg(feature = "server")]
pub mod server;

pub use config::{
    Config, EnhancementFailurePolicy, ImageProviderConfig, ImageResponseFormat, TextProvider,
    TextProviderConfig,
};
pub use enhance::PromptEnhancer;
pub use error::{RelayError, Result};
pub use models::{ErrorBody, GenerateImageRequest, GenerateImageResponse, ImageReference};
pub use providers::{
    GeminiTextClient, ImageGenerator, OpenAiTextClient, ProviderClients, TextGenerator,
    TogetherImageClient,
};
pub use relay::Relay;
pub use storage::{DiskImageSink, ImageSink};
