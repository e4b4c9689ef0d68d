use crate::error::{RelayError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProvider {
    OpenAi,
    Gemini,
}

impl TextProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextProvider::OpenAi => "openai",
            TextProvider::Gemini => "gemini",
        }
    }
}

impl FromStr for TextProvider {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(TextProvider::OpenAi),
            "gemini" | "google" => Ok(TextProvider::Gemini),
            other => Err(RelayError::ConfigError(format!(
                "Unknown enhancement provider: {}",
                other
            ))),
        }
    }
}

/// How the image API is asked to hand back the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageResponseFormat {
    Url,
    Base64,
}

impl ImageResponseFormat {
    /// Value of Together's `response_format` field.
    pub fn as_api_value(&self) -> &'static str {
        match self {
            ImageResponseFormat::Url => "url",
            ImageResponseFormat::Base64 => "b64_json",
        }
    }
}

impl FromStr for ImageResponseFormat {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(ImageResponseFormat::Url),
            "base64" | "b64" | "b64_json" => Ok(ImageResponseFormat::Base64),
            other => Err(RelayError::ConfigError(format!(
                "Unknown image response format: {}",
                other
            ))),
        }
    }
}

/// What to do when the enhancement call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhancementFailurePolicy {
    #[default]
    Fallback,
    Abort,
}

impl FromStr for EnhancementFailurePolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(EnhancementFailurePolicy::Fallback),
            "abort" | "fail" => Ok(EnhancementFailurePolicy::Abort),
            other => Err(RelayError::ConfigError(format!(
                "Unknown enhancement failure policy: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextProviderConfig {
    pub provider: TextProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ImageProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub count: u32,
    pub response_format: ImageResponseFormat,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub text: TextProviderConfig,
    pub image: ImageProviderConfig,
    pub failure_policy: EnhancementFailurePolicy,
    pub image_save_dir: Option<PathBuf>,
    pub frame_ancestors: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

impl Default for TextProviderConfig {
    fn default() -> Self {
        TextProviderConfig {
            provider: TextProvider::OpenAi,
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl TextProviderConfig {
    pub fn openai() -> Self {
        Self::default()
    }

    pub fn gemini() -> Self {
        TextProviderConfig {
            provider: TextProvider::Gemini,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        ImageProviderConfig {
            api_key: None,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_TOGETHER_BASE_URL.to_string(),
            width: 1024,
            height: 768,
            steps: 4,
            count: 1,
            response_format: ImageResponseFormat::Url,
        }
    }
}

impl ImageProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_response_format(mut self, format: ImageResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            text: TextProviderConfig::default(),
            image: ImageProviderConfig::default(),
            failure_policy: EnhancementFailurePolicy::Fallback,
            image_save_dir: None,
            frame_ancestors: None,
            http_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let provider = get("ENHANCEMENT_PROVIDER")
            .map(|v| v.parse::<TextProvider>())
            .transpose()?
            .unwrap_or(TextProvider::OpenAi);

        let mut text = match provider {
            TextProvider::OpenAi => {
                let mut text = TextProviderConfig::openai();
                text.api_key = get("OPENAI_API_KEY");
                if let Some(model) = get("OPENAI_MODEL") {
                    text.model = model;
                }
                if let Some(url) = get("OPENAI_BASE_URL") {
                    text.base_url = url;
                }
                text
            }
            TextProvider::Gemini => {
                let mut text = TextProviderConfig::gemini();
                text.api_key = get("GEMINI_API_KEY");
                if let Some(model) = get("GEMINI_MODEL") {
                    text.model = model;
                }
                if let Some(url) = get("GEMINI_BASE_URL") {
                    text.base_url = url;
                }
                text
            }
        };
        if let Some(max_tokens) = parse_var(&get, "ENHANCEMENT_MAX_TOKENS")? {
            text.max_tokens = max_tokens;
        }
        if let Some(temperature) = parse_var(&get, "ENHANCEMENT_TEMPERATURE")? {
            text.temperature = temperature;
        }

        let mut image = ImageProviderConfig::default();
        image.api_key = get("TOGETHER_API_KEY");
        if let Some(model) = get("TOGETHER_MODEL") {
            image.model = model;
        }
        if let Some(url) = get("TOGETHER_BASE_URL") {
            image.base_url = url;
        }
        if let Some(width) = parse_var(&get, "IMAGE_WIDTH")? {
            image.width = width;
        }
        if let Some(height) = parse_var(&get, "IMAGE_HEIGHT")? {
            image.height = height;
        }
        if let Some(steps) = parse_var(&get, "IMAGE_STEPS")? {
            image.steps = steps;
        }
        if let Some(format) = get("IMAGE_RESPONSE_FORMAT") {
            image.response_format = format.parse()?;
        }

        let failure_policy = get("ENHANCEMENT_FAILURE_POLICY")
            .map(|v| v.parse::<EnhancementFailurePolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Config {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_var(&get, "PORT")?.unwrap_or(defaults.port),
            text,
            image,
            failure_policy,
            image_save_dir: get("IMAGE_SAVE_DIR").map(PathBuf::from),
            frame_ancestors: get("FRAME_ANCESTORS"),
            http_timeout_secs: parse_var(&get, "HTTP_TIMEOUT_SECS")?,
        })
    }

    /// Checks that credentials exist for every provider a request can reach.
    ///
    /// A missing text key is only fatal under the abort policy; with fallback
    /// every enhancement would fail over to the original prompt, which is
    /// logged as a warning instead.
    pub fn validate(&self) -> Result<()> {
        if self.image.api_key.is_none() {
            return Err(RelayError::ConfigError(
                "TOGETHER_API_KEY is required".into(),
            ));
        }
        if self.image.width == 0 || self.image.height == 0 {
            return Err(RelayError::ConfigError(
                "Image dimensions must be non-zero".into(),
            ));
        }
        if self.text.api_key.is_none() {
            let key = match self.text.provider {
                TextProvider::OpenAi => "OPENAI_API_KEY",
                TextProvider::Gemini => "GEMINI_API_KEY",
            };
            match self.failure_policy {
                EnhancementFailurePolicy::Abort => {
                    return Err(RelayError::ConfigError(format!("{} is required", key)));
                }
                EnhancementFailurePolicy::Fallback => {
                    log::warn!(
                        "⚠️  {} is not set; prompts will be sent without enhancement",
                        key
                    );
                }
            }
        }
        Ok(())
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_text(mut self, text: TextProviderConfig) -> Self {
        self.text = text;
        self
    }

    pub fn with_image(mut self, image: ImageProviderConfig) -> Self {
        self.image = image;
        self
    }

    pub fn with_failure_policy(mut self, policy: EnhancementFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_image_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_save_dir = Some(dir.into());
        self
    }

    pub fn with_frame_ancestors(mut self, origin: impl Into<String>) -> Self {
        self.frame_ancestors = Some(origin.into());
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                RelayError::ConfigError(format!("Invalid value for {}: {} ({})", key, raw, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.text.provider, TextProvider::OpenAi);
        assert_eq!(config.text.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.image.width, 1024);
        assert_eq!(config.image.height, 768);
        assert_eq!(config.image.steps, 4);
        assert_eq!(config.image.count, 1);
        assert_eq!(config.image.response_format, ImageResponseFormat::Url);
        assert_eq!(config.failure_policy, EnhancementFailurePolicy::Fallback);
        assert!(config.image_save_dir.is_none());
        assert!(config.http_timeout_secs.is_none());
    }

    #[test]
    fn test_gemini_provider_reads_gemini_vars() {
        let config = Config::from_lookup(lookup(&[
            ("ENHANCEMENT_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
        ]))
        .unwrap();
        assert_eq!(config.text.provider, TextProvider::Gemini);
        assert_eq!(config.text.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.text.model, "gemini-1.5-pro");
        assert_eq!(config.text.base_url, DEFAULT_GEMINI_BASE_URL);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("IMAGE_WIDTH", "512"),
            ("IMAGE_HEIGHT", "512"),
            ("IMAGE_RESPONSE_FORMAT", "base64"),
            ("ENHANCEMENT_FAILURE_POLICY", "abort"),
            ("IMAGE_SAVE_DIR", "/tmp/images"),
            ("HTTP_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.image.width, 512);
        assert_eq!(config.image.response_format, ImageResponseFormat::Base64);
        assert_eq!(config.failure_policy, EnhancementFailurePolicy::Abort);
        assert_eq!(config.image_save_dir, Some(PathBuf::from("/tmp/images")));
        assert_eq!(config.http_timeout_secs, Some(30));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  "), ("PORT", "")]))
            .unwrap();
        assert!(config.text.api_key.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, RelayError::ConfigError(_)));

        let err = Config::from_lookup(lookup(&[("ENHANCEMENT_PROVIDER", "llama")])).unwrap_err();
        assert!(err.to_string().contains("llama"));
    }

    #[test]
    fn test_validate() {
        let config = Config::new();
        assert!(config.validate().is_err());

        let config = Config::new().with_image(ImageProviderConfig::new().with_api_key("t"));
        assert!(config.validate().is_ok());

        let config = config.with_failure_policy(EnhancementFailurePolicy::Abort);
        assert!(config.validate().is_err());

        let config = config.with_text(TextProviderConfig::openai().with_api_key("o"));
        assert!(config.validate().is_ok());
    }
}
