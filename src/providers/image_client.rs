use crate::{
    config::{ImageProviderConfig, ImageResponseFormat},
    error::{RelayError, Result},
    models::{
        ImageGenerationRequest, ImageGenerationResponse, ImageReference, TogetherImageRequest,
        TogetherImageResponse,
    },
    providers::{ensure_success, ImageGenerator},
};
use async_trait::async_trait;
use reqwest::Client;

const TOGETHER: &str = "Together AI";

#[derive(Clone)]
pub struct TogetherImageClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    response_format: ImageResponseFormat,
}

impl TogetherImageClient {
    pub fn new(client: Client, config: &ImageProviderConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            response_format: config.response_format,
        }
    }

    fn pick_image(&self, response: TogetherImageResponse) -> Result<ImageReference> {
        let first = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::ResponseError("No images generated".into()))?;

        let image = match self.response_format {
            ImageResponseFormat::Url => first.url.map(ImageReference::Url),
            ImageResponseFormat::Base64 => first.b64_json.map(ImageReference::Base64),
        };
        image.ok_or_else(|| {
            RelayError::ResponseError(format!(
                "Image response is missing the {} field",
                self.response_format.as_api_value()
            ))
        })
    }
}

#[async_trait]
impl ImageGenerator for TogetherImageClient {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RelayError::ConfigError("TOGETHER_API_KEY is not set".into()))?;

        let payload = TogetherImageRequest {
            model: &self.model,
            prompt: &request.prompt,
            width: request.width,
            height: request.height,
            steps: request.steps,
            n: request.num_images,
            response_format: self.response_format.as_api_value(),
        };

        log::info!(
            "Generating image with model: {} ({}x{}, {} steps)",
            self.model,
            request.width,
            request.height,
            request.steps
        );

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;
        let response = ensure_success(TOGETHER, response).await?;

        let body: TogetherImageResponse = response.json().await?;
        let model = body.model.clone().unwrap_or_else(|| self.model.clone());

        Ok(ImageGenerationResponse {
            image: self.pick_image(body)?,
            model,
        })
    }

    fn name(&self) -> &'static str {
        TOGETHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(prompt: &str) -> ImageGenerationRequest {
        ImageGenerationRequest {
            prompt: prompt.to_string(),
            width: 1024,
            height: 768,
            steps: 4,
            num_images: 1,
        }
    }

    fn client(server: &MockServer, format: ImageResponseFormat) -> TogetherImageClient {
        let config = ImageProviderConfig::new()
            .with_api_key("tg-test")
            .with_base_url(server.uri())
            .with_response_format(format);
        TogetherImageClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn test_sends_fixed_parameters_and_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer tg-test"))
            .and(body_json(json!({
                "model": "black-forest-labs/FLUX.1-schnell-Free",
                "prompt": "a lighthouse",
                "width": 1024,
                "height": 768,
                "steps": 4,
                "n": 1,
                "response_format": "url"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "img-1",
                "model": "black-forest-labs/FLUX.1-schnell-Free",
                "data": [{"index": 0, "url": "https://api.together.ai/imgproxy/abc.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, ImageResponseFormat::Url)
            .generate(&request("a lighthouse"))
            .await
            .unwrap();
        assert_eq!(
            response.image,
            ImageReference::Url("https://api.together.ai/imgproxy/abc.png".into())
        );
    }

    #[tokio::test]
    async fn test_base64_format_returns_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "b64_json": "aGVsbG8="}]
            })))
            .mount(&server)
            .await;

        let response = client(&server, ImageResponseFormat::Base64)
            .generate(&request("a lighthouse"))
            .await
            .unwrap();
        assert_eq!(response.image, ImageReference::Base64("aGVsbG8=".into()));
        assert_eq!(response.model, "black-forest-labs/FLUX.1-schnell-Free");
    }

    #[tokio::test]
    async fn test_empty_data_is_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let err = client(&server, ImageResponseFormat::Url)
            .generate(&request("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::ResponseError(_)));
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
            .mount(&server)
            .await;

        let err = client(&server, ImageResponseFormat::Url)
            .generate(&request("x"))
            .await
            .unwrap_err();
        match err {
            RelayError::ProviderError { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
