// src/digest/mod.rs
//! News digest: fetch feeds, keep what is new, pick one article per source.
//!
//! Pipeline per run:
//! 1. fetch every feed (a failing feed is skipped)
//! 2. drop titles containing an irrelevance keyword
//! 3. drop items the novelty gate rejects (hash, title, summary as body)
//! 4. group by source, least-featured sources first
//! 5. summarize one pick per source until the cap is reached; the pick is
//!    gated again against what this run already appended, then recorded

pub mod feed;

use chrono::NaiveDate;
use metrics::counter;
use tracing::{debug, info, warn};

use crate::config::NoveltyConfig;
use crate::gate::{NoveltyGate, Verdict};
use crate::generate::{labelled_line, Summarizer};
use crate::history::HistoryStore;
use crate::item::ContentItem;
use crate::penalty::rank_sources;
use crate::similarity::{best_match, title_similarity};

pub use feed::{FeedItem, FeedOptions, FeedSource, RssFeed};

#[derive(Debug, Clone, PartialEq)]
pub struct DigestParams {
    pub digest_cap: usize,
    pub penalty_window_days: i64,
    pub irrelevant_keywords: Vec<String>,
}

impl Default for DigestParams {
    fn default() -> Self {
        Self {
            digest_cap: 8,
            penalty_window_days: crate::penalty::DEFAULT_WINDOW_DAYS,
            irrelevant_keywords: Vec::new(),
        }
    }
}

impl From<&NoveltyConfig> for DigestParams {
    fn from(cfg: &NoveltyConfig) -> Self {
        Self {
            digest_cap: cfg.digest_cap,
            penalty_window_days: cfg.penalty_window_days,
            irrelevant_keywords: cfg
                .irrelevant_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }
}

/// Result of one digest build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digest {
    /// One plain-text section per picked article, in publish order.
    pub sections: Vec<String>,
    /// Items appended to history, aligned with `sections`.
    pub picked: Vec<ContentItem>,
    pub failed_feeds: usize,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections joined by blank lines.
    pub fn text(&self) -> String {
        self.sections.join("\n\n").trim().to_string()
    }
}

pub fn is_irrelevant(title: &str, keywords: &[String]) -> bool {
    let t = title.to_lowercase();
    keywords.iter().any(|k| !k.is_empty() && t.contains(&k.to_lowercase()))
}

fn candidate_of(item: &FeedItem, today: NaiveDate) -> ContentItem {
    ContentItem::new(item.title.clone(), item.summary.clone())
        .with_link(item.link.clone())
        .with_source(item.source_name.clone())
        .dated(today)
}

/// Which of `items` the summarizer answer is about: best title match of its
/// `Title:` line, else the first item.
pub fn resolve_pick<'a>(answer: &str, items: &'a [FeedItem]) -> Option<&'a FeedItem> {
    let first = items.first()?;
    let Some(title) = labelled_line(answer, &["title", "titel"]) else {
        return Some(first);
    };
    let titles: Vec<String> = items.iter().map(|i| i.title.clone()).collect();
    let idx = best_match(&title, &titles, title_similarity)
        .and_then(|(_, matched)| titles.iter().position(|t| t == matched))
        .unwrap_or(0);
    items.get(idx).or(Some(first))
}

/// Build today's digest. Transient failures (feeds, summarizer, history
/// writes) are logged and skipped; an empty result means nothing new.
pub async fn build_digest<M, S>(
    feeds: &[Box<dyn FeedSource>],
    summarizer: &M,
    gate: &NoveltyGate,
    store: &mut S,
    params: &DigestParams,
    today: NaiveDate,
) -> Digest
where
    M: Summarizer + ?Sized,
    S: HistoryStore + ?Sized,
{
    let mut digest = Digest::default();

    // Fresh, relevant items grouped by source in first-seen order.
    let mut groups: Vec<(String, Vec<FeedItem>)> = Vec::new();
    for feed in feeds {
        let items = match feed.fetch().await {
            Ok(items) => items,
            Err(e) => {
                warn!(target: "digest", feed = feed.origin(), error = %e, "feed skipped");
                digest.failed_feeds += 1;
                continue;
            }
        };
        for item in items {
            if is_irrelevant(&item.title, &params.irrelevant_keywords) {
                debug!(target: "digest", title = %item.title, "irrelevant");
                continue;
            }
            if !gate.is_novel(&candidate_of(&item, today), &*store) {
                continue;
            }
            match groups.iter_mut().find(|(s, _)| *s == item.source_name) {
                Some((_, v)) => v.push(item),
                None => groups.push((item.source_name.clone(), vec![item])),
            }
        }
    }

    let records = store.hash_records();
    let ranked = rank_sources(groups, &records, params.penalty_window_days, today);

    for (penalty, items) in ranked {
        if digest.sections.len() >= params.digest_cap {
            break;
        }
        let answer = match summarizer.summarize(&penalty.source, &items).await {
            Ok(a) if !a.trim().is_empty() => a.trim().to_string(),
            Ok(_) => {
                warn!(target: "digest", source = %penalty.source, "empty summary");
                continue;
            }
            Err(e) => {
                warn!(target: "digest", source = %penalty.source, error = %e, "summarizer failed");
                continue;
            }
        };
        let Some(pick) = resolve_pick(&answer, &items) else {
            continue;
        };

        // Another source may already have delivered the same story this run.
        let item = candidate_of(pick, today);
        if let Verdict::Reject(why) = gate.evaluate(&item, &*store) {
            debug!(target: "digest", source = %penalty.source, reason = %why, "pick already sent this run");
            continue;
        }
        if let Err(e) = store.append(&item) {
            warn!(target: "digest", error = %e, "history append failed");
        }
        info!(
            target: "digest",
            source = %penalty.source,
            penalty = penalty.count_in_window,
            title = %item.key_title(),
            "picked"
        );
        counter!("digest_items_total").increment(1);
        digest.sections.push(answer);
        digest.picked.push(item);
    }

    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<FeedItem> {
        vec![
            FeedItem::new("Apple ships new chip", "https://a.test/1", "s", "A"),
            FeedItem::new("Design systems at scale", "https://a.test/2", "s", "A"),
        ]
    }

    #[test]
    fn pick_follows_title_line() {
        let its = items();
        let answer = "Category: UX\nTitle: Design systems at scale\nSummary: ...";
        assert_eq!(resolve_pick(answer, &its).unwrap().link, "https://a.test/2");
    }

    #[test]
    fn pick_falls_back_to_first() {
        let its = items();
        assert_eq!(resolve_pick("no labels here", &its).unwrap().link, "https://a.test/1");
        assert!(resolve_pick("x", &[]).is_none());
    }

    #[test]
    fn keyword_filter_is_case_insensitive() {
        let kw = vec!["deal".to_string(), "podcast".to_string()];
        assert!(is_irrelevant("Best DEALS of the week", &kw));
        assert!(!is_irrelevant("Accessible forms", &kw));
    }
}
