// src/config/novelty.rs
//! Tunables for gating, rotation, penalties and the digest run.
//!
//! Lookup order:
//! 1) $NOVELTY_CONFIG_PATH (must exist when set)
//! 2) config/novelty.toml
//! 3) config/novelty.json
//! 4) built-in defaults
//!
//! Every field has a default, so a partial file only overrides what it names.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_NOVELTY_CONFIG_PATH: &str = "NOVELTY_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/novelty.toml";
pub const DEFAULT_JSON_PATH: &str = "config/novelty.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Finite curriculum, every path used once.
    Exhaustion,
    /// Fixed topic list, no repeat within the recency window.
    #[default]
    Cyclic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NoveltyConfig {
    pub title_threshold: f64,
    pub body_threshold: f64,
    pub title_window: usize,
    pub body_window: usize,
    pub max_attempts: u32,
    /// Pass recent titles to the generator as things to avoid.
    pub hint_recent_titles: bool,

    pub rotation: RotationMode,
    pub recency_window: usize,
    pub topics: Vec<String>,
    pub catalog_path: Option<PathBuf>,

    pub penalty_window_days: i64,
    pub digest_cap: usize,
    pub items_per_feed: usize,
    pub summary_chars: usize,
    pub irrelevant_keywords: Vec<String>,
    pub feeds: Vec<String>,

    pub state_dir: PathBuf,
}

impl Default for NoveltyConfig {
    fn default() -> Self {
        Self {
            title_threshold: 0.8,
            body_threshold: 0.75,
            title_window: 10,
            body_window: 10,
            max_attempts: 4,
            hint_recent_titles: false,
            rotation: RotationMode::Cyclic,
            recency_window: 4,
            topics: default_topics(),
            catalog_path: None,
            penalty_window_days: 7,
            digest_cap: 8,
            items_per_feed: 3,
            summary_chars: 600,
            irrelevant_keywords: default_irrelevant_keywords(),
            feeds: default_feeds(),
            state_dir: PathBuf::from("state"),
        }
    }
}

impl NoveltyConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading novelty config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = if ext == "json" {
            serde_json::from_str::<Self>(&content).context("parsing novelty config json")?
        } else {
            toml::from_str::<Self>(&content).context("parsing novelty config toml")?
        };
        Ok(cfg.sanitized())
    }

    /// Env var, then the `config/` fallbacks, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_NOVELTY_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_NOVELTY_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    /// Clamp thresholds into [0,1] and windows/attempts to at least 1.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        for (v, fallback) in [
            (&mut self.title_threshold, d.title_threshold),
            (&mut self.body_threshold, d.body_threshold),
        ] {
            *v = if v.is_finite() { (*v).clamp(0.0, 1.0) } else { fallback };
        }
        self.title_window = self.title_window.max(1);
        self.body_window = self.body_window.max(1);
        self.max_attempts = self.max_attempts.max(1);
        self.recency_window = self.recency_window.max(1);
        self.items_per_feed = self.items_per_feed.max(1);
        self.digest_cap = self.digest_cap.max(1);
        self.penalty_window_days = self.penalty_window_days.max(0);
        self.topics = clean_list(std::mem::take(&mut self.topics));
        self.irrelevant_keywords = clean_list(std::mem::take(&mut self.irrelevant_keywords));
        self.feeds = clean_list(std::mem::take(&mut self.feeds));
        if self.topics.is_empty() {
            self.topics = default_topics();
        }
        self
    }
}

/// Trim, drop empties and duplicates, keep first-seen order (topic order matters).
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn default_topics() -> Vec<String> {
    [
        "UX Research",
        "Interaction Design",
        "Information Architecture",
        "Accessibility",
        "Usability Testing",
        "Visual Design",
        "UX Writing",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_irrelevant_keywords() -> Vec<String> {
    ["deal", "sale", "discount", "coupon", "giveaway", "sponsored"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_feeds() -> Vec<String> {
    [
        "https://www.theverge.com/rss/index.xml",
        "https://techcrunch.com/feed/",
        "https://www.smashingmagazine.com/feed/",
        "https://uxdesign.cc/feed",
        "https://www.heise.de/rss/heise-atom.xml",
        "https://openai.com/blog/rss.xml",
        "https://www.technologyreview.com/feed/",
        "https://feeds.bbci.co.uk/news/technology/rss.xml",
        "https://www.engadget.com/rss.xml",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
