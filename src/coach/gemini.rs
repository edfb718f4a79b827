use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::client::TradeCoach;
use super::config::CoachConfig;
use super::error::CoachError;
use super::rate_limiter::RateLimiter;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<i64>,
    message: Option<String>,
    status: Option<String>,
}

impl From<ProviderErrorBody> for CoachError {
    fn from(body: ProviderErrorBody) -> Self {
        CoachError::ProviderError {
            code: body
                .status
                .or_else(|| body.code.map(|c| c.to_string()))
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            message: body.message.unwrap_or_default(),
        }
    }
}

/// Concatenated text of the first candidate
fn extract_text(body: &str) -> Result<String, CoachError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(error.into());
    }

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CoachError::EmptyResponse);
    }
    Ok(text)
}

pub struct GeminiCoach {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl GeminiCoach {
    pub fn new(config: CoachConfig) -> Result<Self, CoachError> {
        let api_key = config.api_key.ok_or(CoachError::MissingApiKey)?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            rate_limiter: RateLimiter::new(config.rate_limit),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_headers(&self) -> Result<HeaderMap, CoachError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|_| CoachError::MissingApiKey)?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl TradeCoach for GeminiCoach {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CoachError> {
        self.rate_limiter.acquire().await;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoachError::TimeoutError(e.to_string())
                } else {
                    CoachError::HttpError(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 {
            return Err(CoachError::RateLimitError(body));
        }
        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => envelope.error.into(),
                Err(_) => CoachError::ProviderError {
                    code: status.as_u16().to_string(),
                    message: body,
                },
            });
        }

        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Good entry. "},{"text":"Tighten your stop."}],"role":"model"}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Good entry. Tighten your stop.");
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        assert!(matches!(extract_text(r#"{"candidates":[]}"#), Err(CoachError::EmptyResponse)));
    }

    #[test]
    fn test_extract_text_provider_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        match extract_text(body) {
            Err(CoachError::ProviderError { code, message }) => {
                assert_eq!(code, "INVALID_ARGUMENT");
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = CoachConfig {
            api_key: None,
            ..CoachConfig::default()
        };
        assert!(matches!(GeminiCoach::new(config), Err(CoachError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint() {
        let config = CoachConfig {
            api_key: Some("key".to_string()),
            base_url: "http://localhost:9000/".to_string(),
            ..CoachConfig::default()
        };
        let coach = GeminiCoach::new(config).unwrap();
        assert_eq!(
            coach.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(coach.provider_name(), "gemini");
    }
}
