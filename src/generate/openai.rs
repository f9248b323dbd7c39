// src/generate/openai.rs
//! OpenAI chat-completions client that writes lessons and picks digest articles.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{parse_draft, Draft, GenerationRequest, Generator, Summarizer};
use crate::config::BotConfig;
use crate::digest::feed::FeedItem;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Cap on titles echoed back into the prompt as things to avoid.
const MAX_AVOID_TITLES: usize = 30;

pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    lesson_temperature: f32,
    digest_temperature: f32,
}

impl OpenAiClient {
    pub fn new(cfg: &BotConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("fresh-digest/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            endpoint: CHAT_COMPLETIONS_URL.to_string(),
            api_key: cfg.openai_api_key.clone(),
            model: cfg.openai_model.clone(),
            lesson_temperature: cfg.lesson_temperature,
            digest_temperature: cfg.digest_temperature,
        })
    }

    /// Point at a compatible endpoint (proxies, local servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY not set");
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: Option<String>,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?
            .error_for_status()
            .context("openai non-2xx")?;

        let body: Resp = resp.json().await.context("openai response json")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            return Err(anyhow!("openai returned empty content"));
        }
        Ok(content)
    }
}

/// Lesson prompt: simple explanation, one example, one follow-up tip or link.
pub fn lesson_prompt(request: &GenerationRequest) -> String {
    let mut p = String::from(
        "You are a UX mentor sending one short daily lesson on UX design or UX research. \
         Explain the idea in simple words, give one concrete example and one further tip or link. \
         Start with a single line containing only the lesson title. Plain text, no markdown.",
    );
    if let Some(topic) = &request.topic {
        p.push_str(&format!("\n\nTopic of today's lesson: {topic}."));
    }
    if !request.avoid_titles.is_empty() {
        p.push_str("\n\nThese lessons were already sent; choose a clearly different angle and title:\n");
        for t in request.avoid_titles.iter().rev().take(MAX_AVOID_TITLES) {
            p.push_str(&format!("- {t}\n"));
        }
    }
    p
}

/// Digest prompt: pick the single most relevant article of one source.
pub fn digest_prompt(source: &str, items: &[FeedItem]) -> String {
    let mut listing = String::new();
    for (i, a) in items.iter().enumerate() {
        listing.push_str(&format!(
            "{}. Title: {}\nContent: {}\nLink: {}\n\n",
            i + 1,
            a.title,
            a.summary,
            a.link
        ));
    }
    format!(
        "You curate tech news. Below are several new articles from the source '{source}'. \
         Pick the single most relevant article for tech, UX or AI teams.\n\n\
         Answer in plain text (no markdown), exactly in this format:\n\n\
         Category: AI or UX or Tech\n\
         Title: <title of the article>\n\
         Summary: 1-3 sentences on what it is about and why it matters\n\
         Source: <source name> – <link>\n\n\
         Only one article. No intro, no list, no formatting, no bold, no brackets, no quotes.\n\n\
         Articles:\n\n{listing}"
    )
}

#[async_trait]
impl Generator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Draft> {
        let text = self.chat(&lesson_prompt(request), self.lesson_temperature).await?;
        Ok(parse_draft(&text))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    async fn summarize(&self, source: &str, items: &[FeedItem]) -> Result<String> {
        if items.is_empty() {
            bail!("no articles to summarize for {source}");
        }
        self.chat(&digest_prompt(source, items), self.digest_temperature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_prompt_lists_recent_titles_newest_first() {
        let req = GenerationRequest {
            topic: Some("Accessibility".into()),
            avoid_titles: vec!["Old".into(), "Newer".into()],
        };
        let p = lesson_prompt(&req);
        assert!(p.contains("Topic of today's lesson: Accessibility."));
        let newer = p.find("- Newer").unwrap();
        let old = p.find("- Old").unwrap();
        assert!(newer < old);
    }

    #[test]
    fn digest_prompt_numbers_articles() {
        let items = vec![
            FeedItem::new("A", "https://a.test", "sum a", "Src"),
            FeedItem::new("B", "https://b.test", "sum b", "Src"),
        ];
        let p = digest_prompt("Src", &items);
        assert!(p.contains("1. Title: A"));
        assert!(p.contains("2. Title: B\nContent: sum b\nLink: https://b.test"));
    }

    #[tokio::test]
    async fn missing_key_is_a_plain_error() {
        let client = OpenAiClient::new(&BotConfig::default()).unwrap();
        let err = client
            .generate(&GenerationRequest::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
