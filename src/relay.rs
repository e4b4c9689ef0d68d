use crate::{
    config::{Config, EnhancementFailurePolicy, ImageProviderConfig},
    enhance::PromptEnhancer,
    error::{RelayError, Result},
    logger,
    models::{
        GenerateImageRequest, GenerateImageResponse, ImageGenerationRequest, ImageReference,
    },
    providers::{ImageGenerator, ProviderClients},
    storage::{self, DiskImageSink, ImageSink},
};
use std::sync::Arc;

/// Sequences one optional enhancement call and one image call per request.
#[derive(Clone)]
pub struct Relay {
    enhancer: PromptEnhancer,
    image: Arc<dyn ImageGenerator>,
    image_settings: ImageProviderConfig,
    failure_policy: EnhancementFailurePolicy,
    sink: Option<Arc<dyn ImageSink>>,
}

impl Relay {
    pub fn new(clients: ProviderClients, config: &Config) -> Self {
        let sink = config
            .image_save_dir
            .as_ref()
            .map(|dir| Arc::new(DiskImageSink::new(dir)) as Arc<dyn ImageSink>);

        Self {
            enhancer: PromptEnhancer::new(clients.text().clone())
                .with_max_tokens(config.text.max_tokens),
            image: clients.image().clone(),
            image_settings: config.image.clone(),
            failure_policy: config.failure_policy,
            sink,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let clients = ProviderClients::from_config(config)?;
        Ok(Self::new(clients, config))
    }

    pub fn with_sink(mut self, sink: Arc<dyn ImageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub async fn generate(&self, request: GenerateImageRequest) -> Result<GenerateImageResponse> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        let _timer = logger::timer(&format!("generate-image {}", &request_id[..8]));

        let prompt = validate_prompt(request.prompt)?;
        log::info!(
            "🎨 [{}] Prompt received ({} chars, enhancement {})",
            &request_id[..8],
            prompt.chars().count(),
            if request.skip_enhancement { "skipped" } else { "requested" }
        );

        let enhanced_prompt = if request.skip_enhancement {
            prompt
        } else {
            self.enhance_or_fallback(&request_id[..8], prompt).await?
        };

        let image_request = ImageGenerationRequest {
            prompt: enhanced_prompt.clone(),
            width: self.image_settings.width,
            height: self.image_settings.height,
            steps: self.image_settings.steps,
            num_images: self.image_settings.count,
        };

        let generated = self.image.generate(&image_request).await.map_err(|e| {
            log::error!("❌ [{}] Image generation failed: {}", &request_id[..8], e);
            e
        })?;
        log::info!(
            "✅ [{}] Image generated with {}",
            &request_id[..8],
            generated.model
        );

        if let (Some(sink), ImageReference::Base64(data)) = (&self.sink, &generated.image) {
            if let Err(e) = storage::save_base64(sink.as_ref(), data).await {
                log::warn!("⚠️  [{}] Could not save image: {}", &request_id[..8], e);
            }
        }

        Ok(GenerateImageResponse::new(enhanced_prompt, generated.image))
    }

    async fn enhance_or_fallback(&self, request_id: &str, prompt: String) -> Result<String> {
        match self.enhancer.enhance(&prompt).await {
            Ok(enhanced) => {
                log::info!(
                    "✨ [{}] Prompt enhanced by {} ({} chars)",
                    request_id,
                    self.enhancer.provider(),
                    enhanced.chars().count()
                );
                log::debug!("[{}] Enhanced prompt: {}", request_id, enhanced);
                Ok(enhanced)
            }
            Err(e) => match self.failure_policy {
                EnhancementFailurePolicy::Fallback => {
                    log::warn!(
                        "⚠️  [{}] Enhancement failed, using original prompt: {}",
                        request_id,
                        e
                    );
                    Ok(prompt)
                }
                EnhancementFailurePolicy::Abort => {
                    log::error!("❌ [{}] Enhancement failed: {}", request_id, e);
                    Err(e)
                }
            },
        }
    }
}

fn validate_prompt(prompt: Option<String>) -> Result<String> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(RelayError::InvalidRequest("Prompt is required".into())),
    }
}
