use crate::{
    error::{RelayError, Result},
    models::TextGenerationRequest,
    providers::TextGenerator,
};
use std::sync::Arc;

/// Placeholder replaced with the user's prompt in [`ENHANCEMENT_TEMPLATE`].
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

pub const ENHANCEMENT_TEMPLATE: &str = r#"You are an AI assistant specializing in refining user prompts for the Flux image generation model.
Flux requires two complementary prompts that work together to create one cohesive image.
When refining user prompts, follow these guidelines:

Topic: {topic}

1. Enhanced Prompt (Natural Language):
- Provide an extremely detailed description of the image in natural language, using up to 512 tokens.
- Break down the scene into key components: subjects, setting, lighting, colors, composition, and atmosphere.
- Describe subjects in great detail, including their appearance, pose, expression, clothing, and any interactions between them.
- Elaborate on the setting, specifying the time of day, location specifics, architectural details, and any relevant objects or props.
- Explain the lighting conditions, including the source, intensity, shadows, and how it affects the overall scene.
- Using your knowledge set, select an appropriate high-end camera and lens combination that should be used to capture the image.
- Specify color palettes and any significant color contrasts or harmonies that contribute to the image's visual impact.
- Detail the composition, describing the foreground, middle ground, background, and focal points to create a sense of depth and guide the viewer's eye.
- Convey the overall mood and atmosphere of the scene, using emotive language to evoke the desired feeling.
- Use vivid, descriptive language to paint a clear picture, as Flux follows instructions precisely but lacks inherent creativity.
- Avoid using grammatically negative statements or describing what the image should not include, as Flux may struggle to interpret these correctly.
  Instead, focus on positively stating what should be present in the image.

2. Keyword Prompt (Concise Keywords):
- Create a concise list of essential keywords and phrases, limited to 50-60 tokens (maximum 70).
- Prioritize the keywords in this order: main subject(s), art style, setting, important features, emotions/mood, lighting, and color scheme.
- Include relevant artistic techniques, visual effects, or stylistic elements if applicable to the requested image.
- Use commas to separate keywords and phrases, ensuring clarity and readability.
- Ensure that the keywords align perfectly with the details provided in the Enhanced prompt, as both prompts work together to generate the final image.
- Focus on keywords that positively describe what should be present in the image, rather than using keywords that negate or exclude certain elements.

When generating these prompts:
- Understand that the Enhanced and Keyword prompts are deeply connected and must align perfectly to create a single, cohesive image.
- Adapt your language and terminology to the requested art style (e.g., photorealistic, anime, oil painting) to maintain consistency across both prompts.
  The default style should be photorealistic unless it is stated otherwise in the user's original prompt.
- Consider potential visual symbolism, metaphors, or allegories that could enhance the image's meaning and impact,
  and include them in both prompts when relevant.
- For character-focused images, emphasize personality traits and emotions through visual cues such as facial expressions,
  body language, and clothing choices, ensuring consistency between the Enhanced and Keyword prompts.
- Maintain grammatically positive statements throughout both prompts, focusing on what the image should include rather than what it should not,
  as Flux may struggle with interpreting negative statements accurately.
- Respond with the two prompts only, with no preamble or closing remarks."#;

pub fn build_enhancement_prompt(prompt: &str) -> String {
    ENHANCEMENT_TEMPLATE.replace(TOPIC_PLACEHOLDER, prompt)
}

/// Rewrites a user prompt into a detailed image prompt through a text model.
#[derive(Clone)]
pub struct PromptEnhancer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: Option<u32>,
}

impl PromptEnhancer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider(&self) -> &'static str {
        self.generator.name()
    }

    /// Returns the trimmed enhanced prompt. A blank reply is an error so
    /// callers never forward an empty prompt.
    pub async fn enhance(&self, prompt: &str) -> Result<String> {
        let request = TextGenerationRequest {
            prompt: build_enhancement_prompt(prompt),
            max_tokens: self.max_tokens,
            temperature: None,
        };

        let text = self.generator.generate(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(RelayError::ResponseError(format!(
                "{} returned an empty enhanced prompt",
                self.generator.name()
            )));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedText {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for CannedText {
        async fn generate(&self, request: &TextGenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.prompt.clone());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn canned(reply: &str) -> Arc<CannedText> {
        Arc::new(CannedText {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_template_interpolates_topic() {
        let prompt = build_enhancement_prompt("a cat on a skateboard");
        assert!(prompt.contains("Topic: a cat on a skateboard"));
        assert!(!prompt.contains(TOPIC_PLACEHOLDER));
        assert!(prompt.starts_with("You are an AI assistant"));
    }

    #[tokio::test]
    async fn test_enhance_wraps_prompt_and_trims_reply() {
        let generator = canned("  A ginger cat riding a skateboard at golden hour.\n");
        let enhancer = PromptEnhancer::new(generator.clone());

        let enhanced = enhancer.enhance("a cat on a skateboard").await.unwrap();
        assert_eq!(enhanced, "A ginger cat riding a skateboard at golden hour.");

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Topic: a cat on a skateboard"));
    }

    #[tokio::test]
    async fn test_blank_reply_is_error() {
        let enhancer = PromptEnhancer::new(canned(" \n\t"));
        let err = enhancer.enhance("a cat").await.unwrap_err();
        assert!(matches!(err, RelayError::ResponseError(_)));
    }
}
