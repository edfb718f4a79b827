use super::client::RateLimitConfig;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            rate_limit: RateLimitConfig {
                requests_per_second: 1,
                burst_size: 3,
            },
        }
    }
}

impl CoachConfig {
    /// Read `API_KEY` (or `GEMINI_API_KEY`), `GEMINI_MODEL`, `GEMINI_BASE_URL`
    /// and `GEMINI_TIMEOUT_SECS` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let api_key = non_blank("API_KEY").or_else(|| non_blank("GEMINI_API_KEY"));
        if api_key.is_none() {
            log::warn!("API_KEY environment variable not set. AI features will be disabled.");
        }

        Self {
            api_key,
            model: non_blank("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_blank("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: non_blank("GEMINI_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
            rate_limit: defaults.rate_limit,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
