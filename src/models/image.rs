use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub num_images: u32,
}

/// Where the generated picture can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Url(String),
    Base64(String),
}

#[derive(Debug, Clone)]
pub struct ImageGenerationResponse {
    pub image: ImageReference,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct TogetherImageRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub n: u32,
    pub response_format: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TogetherImageResponse {
    #[serde(default)]
    pub data: Vec<TogetherImageData>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TogetherImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

/// Error envelope shared by OpenAI-compatible APIs and Gemini.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorEnvelope {
    pub error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProviderErrorBody {
    Detailed { message: String },
    Plain(String),
}

impl ProviderErrorEnvelope {
    pub fn message(self) -> Option<String> {
        match self.error? {
            ProviderErrorBody::Detailed { message } => Some(message),
            ProviderErrorBody::Plain(message) => Some(message),
        }
    }
}
