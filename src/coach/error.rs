use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Invalid API response: {0}")]
    ParseError(String),

    #[error("Provider error: {code} - {message}")]
    ProviderError { code: String, message: String },

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Empty response from provider")]
    EmptyResponse,
}

impl From<serde_json::Error> for CoachError {
    fn from(err: serde_json::Error) -> Self {
        CoachError::ParseError(err.to_string())
    }
}
