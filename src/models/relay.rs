use serde::{Deserialize, Serialize};

use super::image::ImageReference;

/// Body of `POST /api/generate-image`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub skip_enhancement: bool,
}

impl GenerateImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            skip_enhancement: false,
        }
    }

    pub fn skipping_enhancement(mut self) -> Self {
        self.skip_enhancement = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub enhanced_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl GenerateImageResponse {
    pub fn new(enhanced_prompt: String, image: ImageReference) -> Self {
        let (image_url, image_data) = match image {
            ImageReference::Url(url) => (Some(url), None),
            ImageReference::Base64(data) => (None, Some(data)),
        };
        Self {
            enhanced_prompt,
            image_url,
            image_data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
