use async_trait::async_trait;

use super::error::CoachError;

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// A text service that turns a coaching prompt into feedback
#[async_trait]
pub trait TradeCoach: Send + Sync {
    /// Provider name for log lines (e.g. "gemini")
    fn provider_name(&self) -> &str;

    /// Send the prompt and return the reply verbatim
    async fn complete(&self, prompt: &str) -> Result<String, CoachError>;
}
