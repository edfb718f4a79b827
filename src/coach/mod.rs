//! Free-text coaching feedback for a single trade.
//!
//! The provider is a collaborator: its reply is passed through untouched,
//! and any failure degrades to a localized message.

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod prompt;
pub mod rate_limiter;

use crate::models::{Language, TradeWithPL};

pub use client::{RateLimitConfig, TradeCoach};
pub use config::CoachConfig;
pub use error::CoachError;
pub use gemini::GeminiCoach;
pub use prompt::build_prompt;
pub use rate_limiter::RateLimiter;

pub fn unavailable_message(language: Language) -> &'static str {
    match language {
        Language::Fa => "تحلیل هوش مصنوعی در دسترس نیست. لطفاً کلید API خود را پیکربندی کنید.",
        Language::En => "AI analysis is unavailable. Please configure your API key.",
    }
}

pub fn failure_message(language: Language) -> &'static str {
    match language {
        Language::Fa => "خطایی در تحلیل معامله رخ داد. لطفاً بعداً دوباره امتحان کنید.",
        Language::En => "There was an error analyzing the trade. Please try again later.",
    }
}

/// Build a coach from configuration; `None` when no API key is set.
pub fn coach_from_config(config: CoachConfig) -> Option<Box<dyn TradeCoach>> {
    if !config.is_enabled() {
        return None;
    }
    match GeminiCoach::new(config) {
        Ok(coach) => Some(Box::new(coach) as Box<dyn TradeCoach>),
        Err(e) => {
            log::error!("Failed to initialize coaching client: {}", e);
            None
        }
    }
}

/// Coaching text for `trade`. Never fails: missing or failing providers
/// yield a localized notice instead.
pub async fn analyze_trade(
    coach: Option<&dyn TradeCoach>,
    trade: &TradeWithPL,
    language: Language,
) -> String {
    let Some(coach) = coach else {
        return unavailable_message(language).to_string();
    };

    let prompt = build_prompt(trade, language);
    match coach.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!(
                "Error fetching AI analysis from {} for trade {}: {}",
                coach.provider_name(),
                trade.trade.id,
                e
            );
            failure_message(language).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::with_pl;
    use crate::models::TradeType;
    use crate::models::fixtures::record;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedCoach {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TradeCoach for ScriptedCoach {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> Result<String, CoachError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or(CoachError::EmptyResponse)
        }
    }

    fn trade() -> TradeWithPL {
        with_pl(&[record("t1", TradeType::Long, 100.0, 110.0, 2.0)]).remove(0)
    }

    #[tokio::test]
    async fn test_reply_passed_through() {
        let coach = ScriptedCoach {
            reply: Some("Solid execution.".to_string()),
            prompts: Mutex::new(Vec::new()),
        };

        let text = analyze_trade(Some(&coach as &dyn TradeCoach), &trade(), Language::En).await;
        assert_eq!(text, "Solid execution.");

        let prompts = coach.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("A profit of $20.00"));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_localized_text() {
        let coach = ScriptedCoach {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        };

        let text = analyze_trade(Some(&coach as &dyn TradeCoach), &trade(), Language::Fa).await;
        assert_eq!(text, failure_message(Language::Fa));
    }

    #[tokio::test]
    async fn test_missing_coach() {
        let text = analyze_trade(None, &trade(), Language::En).await;
        assert_eq!(text, unavailable_message(Language::En));
    }

    #[test]
    fn test_coach_from_config_requires_key() {
        assert!(coach_from_config(CoachConfig::default()).is_none());

        let config = CoachConfig {
            api_key: Some("key".to_string()),
            ..CoachConfig::default()
        };
        assert_eq!(coach_from_config(config).unwrap().provider_name(), "gemini");
    }
}
