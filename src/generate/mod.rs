// src/generate/mod.rs
//! Generator boundary: whatever writes lessons and picks digest articles.
//!
//! The core treats both traits as black boxes. Errors are transient: the
//! retry loop spends an attempt, the digest skips the source.

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::digest::feed::FeedItem;

pub use openai::OpenAiClient;

/// What the generator is asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// Topic label; `None` lets the generator choose.
    pub topic: Option<String>,
    /// Recently sent titles the generator should steer away from.
    pub avoid_titles: Vec<String>,
}

impl GenerationRequest {
    pub fn for_topic(topic: Option<String>) -> Self {
        Self {
            topic,
            avoid_titles: Vec::new(),
        }
    }
}

/// Raw generator output before it becomes a `ContentItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Draft>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Pick the most relevant of `items` (all from `source`) and return a
    /// plain-text digest section for it.
    async fn summarize(&self, source: &str, items: &[FeedItem]) -> Result<String>;
}

/// Split model output into title + body.
///
/// Title comes from a `Title:`/`Titel:` line when present, else the first
/// non-empty line with markdown heading/bold markers stripped. Body is the
/// whole trimmed text.
pub fn parse_draft(text: &str) -> Draft {
    let body = text.trim().to_string();
    let title = labelled_line(&body, &["title", "titel"])
        .or_else(|| body.lines().map(clean_heading).find(|l| !l.is_empty()))
        .unwrap_or_default();
    Draft { title, body }
}

/// Value of the first `Label: value` line matching one of `labels`
/// (case-insensitive).
pub fn labelled_line(text: &str, labels: &[&str]) -> Option<String> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*[*_#>\s]*([A-Za-zÄÖÜäöü]+)\s*[*_]*\s*:\s*(.+?)\s*$").unwrap()
    });
    text.lines().find_map(|line| {
        let caps = re.captures(line)?;
        let label = caps.get(1)?.as_str().to_lowercase();
        if labels.contains(&label.as_str()) {
            let v = clean_heading(caps.get(2)?.as_str());
            (!v.is_empty()).then_some(v)
        } else {
            None
        }
    })
}

fn clean_heading(line: &str) -> String {
    line.trim()
        .trim_start_matches(['#', '>', '-'])
        .trim()
        .trim_matches(['*', '_', '"', '“', '”'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_becomes_title() {
        let d = parse_draft("\n## **Card sorting basics**\n\nCard sorting helps you...\n");
        assert_eq!(d.title, "Card sorting basics");
        assert!(d.body.starts_with("## **Card sorting basics**"));
    }

    #[test]
    fn labelled_title_wins() {
        let d = parse_draft("Kategorie: UX\nTitel: Dark patterns in checkout\nZusammenfassung: ...");
        assert_eq!(d.title, "Dark patterns in checkout");
        let e = parse_draft("Category: AI\n**Title:** New model released\nSummary: ...");
        assert_eq!(e.title, "New model released");
    }

    #[test]
    fn empty_text_gives_empty_title() {
        let d = parse_draft("   \n ");
        assert!(d.title.is_empty());
        assert!(d.body.is_empty());
    }

    #[test]
    fn labelled_line_ignores_other_labels() {
        let t = "Category: Tech\nSource: Verge – https://v.test/a";
        assert_eq!(labelled_line(t, &["source"]).as_deref(), Some("Verge – https://v.test/a"));
        assert_eq!(labelled_line(t, &["title"]), None);
    }
}
