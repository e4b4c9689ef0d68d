use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("{provider} returned {status}: {message}")]
    ProviderError {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Response error: {0}")]
    ResponseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RelayError {
    /// HTTP status the relay endpoint answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) => 400,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs may carry credentials in the query string.
        let e = e.without_url();
        if e.is_decode() {
            RelayError::ResponseError(e.to_string())
        } else {
            RelayError::RequestError(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::InvalidRequest("x".into()).http_status(), 400);
        assert_eq!(RelayError::ResponseError("x".into()).http_status(), 500);
        assert_eq!(
            RelayError::ProviderError {
                provider: "Together AI",
                status: 429,
                message: "slow down".into(),
            }
            .http_status(),
            500
        );
    }

    #[test]
    fn test_provider_error_display() {
        let err = RelayError::ProviderError {
            provider: "OpenAI",
            status: 401,
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(err.to_string(), "OpenAI returned 401: Incorrect API key provided");
    }

    #[tokio::test]
    async fn test_transport_error_omits_request_url() {
        let err = reqwest::Client::new()
            .post("http://127.0.0.1:1/models/m:generateContent?key=SECRET-KEY")
            .send()
            .await
            .unwrap_err();

        let err = RelayError::from(err);
        assert!(matches!(err, RelayError::RequestError(_)));
        assert!(!err.to_string().contains("SECRET-KEY"));
        assert!(!err.to_string().contains("127.0.0.1"));
    }
}
