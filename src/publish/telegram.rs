use super::{Message, Publisher};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::BotConfig;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramPublisher {
    api_base: String,
    token: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
}

impl TelegramPublisher {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            api_base: API_BASE.to_string(),
            token,
            chat_id,
            client: Client::new(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::new(cfg.telegram_token.clone(), cfg.telegram_chat_id.clone())
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Form fields for `sendMessage`. No `parse_mode`: texts are plain.
    fn form<'a>(&'a self, message: &'a Message) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![("chat_id", self.chat_id.as_str()), ("text", message.text.as_str())];
        if !message.plain {
            form.push(("disable_web_page_preview", "true"));
        }
        form
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish(&self, message: &Message) -> Result<()> {
        if self.token.is_empty() || self.chat_id.is_empty() {
            bail!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set");
        }
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(&self.form(message))
            .send()
            .await
            .context("telegram request failed")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            bail!("telegram HTTP {status}: {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flag_only_on_rich_messages() {
        let t = TelegramPublisher::new("tok".into(), "42".into());
        let rich = Message {
            text: "hi".into(),
            plain: false,
        };
        let plain = Message {
            text: "hi".into(),
            plain: true,
        };
        assert!(t.form(&rich).contains(&("disable_web_page_preview", "true")));
        assert_eq!(t.form(&plain), vec![("chat_id", "42"), ("text", "hi")]);
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_network() {
        let t = TelegramPublisher::new(String::new(), String::new());
        let err = t
            .publish(&Message {
                text: "x".into(),
                plain: true,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }
}
