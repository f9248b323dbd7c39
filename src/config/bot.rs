// src/config/bot.rs
use serde::{Deserialize, Serialize};
use std::env;

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Credentials and endpoints for the external collaborators.
///
/// Missing keys are not fatal here: the model client and the publisher
/// report them as failed calls, so a run ends in "nothing published".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    pub openai_api_key: String,
    #[serde(default = "default_model")]
    pub openai_model: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    /// Sampling temperature for lessons (variety helps the retry loop).
    pub lesson_temperature: f32,
    /// Sampling temperature for digest picks.
    pub digest_temperature: f32,
}

impl BotConfig {
    /// Read from the process environment (call `dotenvy::dotenv()` first).
    ///
    /// `prefix` selects a per-bot namespace, e.g. `Some("UX")` reads
    /// `UX_OPENAI_API_KEY` before falling back to `OPENAI_API_KEY`.
    pub fn from_env(prefix: Option<&str>) -> Self {
        let get = |name: &str| -> Option<String> {
            prefix
                .and_then(|p| env::var(format!("{p}_{name}")).ok())
                .or_else(|| env::var(name).ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let temp = |name: &str, fallback: f32| -> f32 {
            get(name)
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|t| (0.0..=2.0).contains(t))
                .unwrap_or(fallback)
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(default_model),
            telegram_token: get("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
            lesson_temperature: temp("LESSON_TEMPERATURE", 0.7),
            digest_temperature: temp("DIGEST_TEMPERATURE", 0.4),
        }
    }

    /// Safe diagnostics: never the secrets, only whether they are present.
    pub fn log_summary(&self) {
        tracing::info!(
            model = %self.openai_model,
            openai_key_len = self.openai_api_key.len(),
            telegram_configured = !self.telegram_token.is_empty() && !self.telegram_chat_id.is_empty(),
            "bot config loaded"
        );
    }
}
