//! # Content Item
//! The unit that flows through the gate: one generated lesson or one picked
//! feed article. Immutable once built; identity for exact-duplicate checks is
//! the trimmed title, plus a sha256 of `title + link` for feed articles.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
    /// Origin source (feed title) for digest items.
    pub source: Option<String>,
    pub link: Option<String>,
    pub published_at: NaiveDate,
}

impl ContentItem {
    /// New item dated today (UTC) with no topic/source/link.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            topic: None,
            source: None,
            link: None,
            published_at: Utc::now().date_naive(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.published_at = date;
        self
    }

    /// Trimmed title, the exact-match identity.
    pub fn key_title(&self) -> &str {
        self.title.trim()
    }

    /// Hex sha256 of `title.trim() + link.trim()`.
    pub fn content_hash(&self) -> String {
        content_hash(&self.title, self.link.as_deref().unwrap_or_default())
    }
}

pub fn content_hash(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.trim().as_bytes());
    hasher.update(link.trim().as_bytes());
    hex(&hasher.finalize())
}

/// Short anonymised id for log lines (first 6 bytes of sha256).
pub(crate) fn short_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex(&digest[..6])
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
