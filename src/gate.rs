//! # Novelty Gate
//! Decides whether a candidate is fresh enough to publish.
//!
//! Checks run in order and the first failure rejects:
//! 1. empty title
//! 2. exact title (trimmed) anywhere in the title history
//! 3. content hash already sent (only for candidates with a link)
//! 4. fuzzy title vs the last `title_window` titles, `> title_threshold`
//! 5. fuzzy body vs the last `body_window` bodies, `> body_threshold`
//!
//! Comparisons are strict: a score exactly at the threshold passes. An empty
//! window passes its check. Rejection is a normal outcome, not an error.

use metrics::counter;
use tracing::info;

use crate::config::NoveltyConfig;
use crate::history::{single_line, HistoryKind, HistoryStore};
use crate::item::ContentItem;
use crate::similarity::{best_match, body_similarity, title_similarity};

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_BODY_THRESHOLD: f64 = 0.75;
pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    pub title_threshold: f64,
    pub body_threshold: f64,
    pub title_window: usize,
    pub body_window: usize,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            title_threshold: DEFAULT_TITLE_THRESHOLD,
            body_threshold: DEFAULT_BODY_THRESHOLD,
            title_window: DEFAULT_WINDOW,
            body_window: DEFAULT_WINDOW,
        }
    }
}

impl From<&NoveltyConfig> for GateParams {
    fn from(cfg: &NoveltyConfig) -> Self {
        Self {
            title_threshold: cfg.title_threshold,
            body_threshold: cfg.body_threshold,
            title_window: cfg.title_window,
            body_window: cfg.body_window,
        }
    }
}

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    EmptyTitle,
    ExactTitle,
    SeenHash,
    SimilarTitle { score: f64, matched: String },
    SimilarBody { score: f64 },
}

impl Rejection {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::EmptyTitle => "empty_title",
            Rejection::ExactTitle => "exact_title",
            Rejection::SeenHash => "seen_hash",
            Rejection::SimilarTitle { .. } => "similar_title",
            Rejection::SimilarBody { .. } => "similar_body",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::EmptyTitle => write!(f, "empty title"),
            Rejection::ExactTitle => write!(f, "title already sent"),
            Rejection::SeenHash => write!(f, "article already sent"),
            Rejection::SimilarTitle { score, matched } => {
                write!(f, "title too similar to \"{matched}\" ({score:.2})")
            }
            Rejection::SimilarBody { score } => write!(f, "body too similar ({score:.2})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Admit,
    Reject(Rejection),
}

impl Verdict {
    pub fn is_admit(&self) -> bool {
        matches!(self, Verdict::Admit)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoveltyGate {
    params: GateParams,
}

impl NoveltyGate {
    pub fn new(params: GateParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GateParams {
        &self.params
    }

    pub fn is_novel<S: HistoryStore + ?Sized>(&self, candidate: &ContentItem, store: &S) -> bool {
        self.evaluate(candidate, store).is_admit()
    }

    pub fn evaluate<S: HistoryStore + ?Sized>(&self, candidate: &ContentItem, store: &S) -> Verdict {
        let verdict = self.check(candidate, store);
        match &verdict {
            Verdict::Admit => {
                counter!("novelty_admitted_total").increment(1);
            }
            Verdict::Reject(why) => {
                counter!("novelty_rejected_total", "reason" => why.label()).increment(1);
                info!(target: "novelty", title = %candidate.key_title(), reason = %why, "candidate rejected");
            }
        }
        verdict
    }

    fn check<S: HistoryStore + ?Sized>(&self, candidate: &ContentItem, store: &S) -> Verdict {
        let title = candidate.key_title();
        if title.is_empty() {
            return Verdict::Reject(Rejection::EmptyTitle);
        }

        if store.contains_exact(HistoryKind::Title, &single_line(title)) {
            return Verdict::Reject(Rejection::ExactTitle);
        }

        if candidate.link.is_some()
            && store.contains_exact(HistoryKind::Hash, &candidate.content_hash())
        {
            return Verdict::Reject(Rejection::SeenHash);
        }

        let titles = store.recent(HistoryKind::Title, self.params.title_window);
        if let Some((score, matched)) = best_match(title, &titles, title_similarity) {
            if score > self.params.title_threshold {
                return Verdict::Reject(Rejection::SimilarTitle {
                    score,
                    matched: matched.to_string(),
                });
            }
        }

        let bodies = store.recent(HistoryKind::Body, self.params.body_window);
        if let Some((score, _)) = best_match(candidate.body.trim(), &bodies, body_similarity) {
            if score > self.params.body_threshold {
                return Verdict::Reject(Rejection::SimilarBody { score });
            }
        }

        Verdict::Admit
    }
}
