//! # Retry Coordinator
//! Bounded generate → gate loop for one topic.
//!
//! The generator is called at most `max_attempts` times. A generator error
//! spends an attempt just like a rejection. On admit the item is appended to
//! the store and returned; on exhaustion the store is left untouched.

use metrics::counter;
use tracing::{info, warn};

use crate::config::NoveltyConfig;
use crate::gate::{NoveltyGate, Verdict};
use crate::generate::{GenerationRequest, Generator};
use crate::history::{HistoryKind, HistoryStore};
use crate::item::{short_id, ContentItem};

pub const DEFAULT_MAX_ATTEMPTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryParams {
    pub max_attempts: usize,
    /// Pass recent titles to the generator as things to avoid.
    pub hint_recent_titles: bool,
    pub hint_window: usize,
}

impl Default for RetryParams {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            hint_recent_titles: false,
            hint_window: crate::gate::DEFAULT_WINDOW,
        }
    }
}

impl From<&NoveltyConfig> for RetryParams {
    fn from(cfg: &NoveltyConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts as usize,
            hint_recent_titles: cfg.hint_recent_titles,
            hint_window: cfg.title_window,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    /// Admitted on attempt `attempt` (1-based) and appended to history.
    Admitted { item: ContentItem, attempt: usize },
    /// Every attempt was rejected or failed.
    Exhausted { attempts: usize },
}

impl Production {
    pub fn item(&self) -> Option<&ContentItem> {
        match self {
            Production::Admitted { item, .. } => Some(item),
            Production::Exhausted { .. } => None,
        }
    }
}

/// Produce one novel item for `request.topic`, or give up after
/// `params.max_attempts` tries. The admitted item carries `request.topic`.
pub async fn produce_novel<G, S>(
    request: &GenerationRequest,
    generator: &G,
    gate: &NoveltyGate,
    store: &mut S,
    params: RetryParams,
) -> Production
where
    G: Generator + ?Sized,
    S: HistoryStore + ?Sized,
{
    let mut request = request.clone();
    if params.hint_recent_titles {
        request.avoid_titles = store.recent(HistoryKind::Title, params.hint_window);
    }

    for attempt in 1..=params.max_attempts {
        let draft = match generator.generate(&request).await {
            Ok(d) => d,
            Err(e) => {
                warn!(target: "retry", attempt, generator = generator.name(), error = %e, "generation failed");
                continue;
            }
        };

        let mut candidate = ContentItem::new(draft.title, draft.body);
        candidate.topic = request.topic.clone();

        match gate.evaluate(&candidate, &*store) {
            Verdict::Admit => {
                if let Err(e) = store.append(&candidate) {
                    warn!(target: "retry", error = %e, "history append failed; item is still published");
                }
                info!(
                    target: "retry",
                    attempt,
                    title = %candidate.key_title(),
                    body_id = %short_id(&candidate.body),
                    "candidate admitted"
                );
                return Production::Admitted {
                    item: candidate,
                    attempt,
                };
            }
            Verdict::Reject(why) => {
                info!(target: "retry", attempt, title = %candidate.key_title(), reason = %why, "retrying");
            }
        }
    }

    counter!("retry_exhausted_total").increment(1);
    warn!(target: "retry", attempts = params.max_attempts, topic = ?request.topic, "no novel candidate");
    Production::Exhausted {
        attempts: params.max_attempts,
    }
}
