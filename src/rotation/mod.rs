//! # Rotation Scheduler
//! Picks the next topic so the same subject does not come back too soon.
//!
//! Two policies:
//! - **Exhaustion** (curriculum): uniform random pick among catalog paths not
//!   yet used; the pick is marked used durably *before* it is returned. When
//!   nothing is left the result is `None`, a normal terminal state.
//! - **Cyclic** (rotating topics): first topic in list order that is not among
//!   the last `k` topic-history entries; if every topic is in the window, the
//!   first topic. Never exhausts.

pub mod catalog;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{NoveltyConfig, RotationMode};
use crate::history::{HistoryKind, HistoryStore, UsedSetStore};

pub use catalog::{Catalog, CatalogEntry};

pub const DEFAULT_RECENCY_WINDOW: usize = 4;

#[derive(Debug, Clone)]
pub struct ExhaustionScheduler {
    catalog: Catalog,
}

impl ExhaustionScheduler {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Entries not yet consumed, in catalog order.
    pub fn remaining<U: UsedSetStore + ?Sized>(&self, used: &U) -> Vec<&CatalogEntry> {
        let used = used.used();
        self.catalog
            .entries()
            .iter()
            .filter(|e| !used.contains(&e.key()))
            .collect()
    }

    /// Next unused entry, marked used before returning. `Ok(None)` once the
    /// catalog is exhausted. A failed mark is an error: handing out an entry
    /// that was not recorded could repeat it next run.
    pub fn next<U, R>(&self, used: &mut U, rng: &mut R) -> Result<Option<CatalogEntry>>
    where
        U: UsedSetStore + ?Sized,
        R: Rng,
    {
        let remaining = self.remaining(used);
        if remaining.is_empty() {
            info!(target: "rotation", total = self.catalog.len(), "catalog exhausted");
            return Ok(None);
        }
        let pick = remaining[rng.random_range(0..remaining.len())].clone();
        used.mark_used(&pick.key())
            .with_context(|| format!("marking {} as used", pick.key()))?;
        debug!(target: "rotation", entry = %pick, left = remaining.len() - 1, "curriculum pick");
        Ok(Some(pick))
    }
}

#[derive(Debug, Clone)]
pub struct CyclicScheduler {
    topics: Vec<String>,
    window: usize,
}

impl CyclicScheduler {
    pub fn new(topics: Vec<String>, window: usize) -> Self {
        Self { topics, window }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Pure selection against an explicit recent-topics slice.
    pub fn pick<'a>(&'a self, recent: &[String]) -> Option<&'a str> {
        self.topics
            .iter()
            .find(|t| !recent.iter().any(|r| r.trim() == t.trim()))
            .or_else(|| self.topics.first())
            .map(String::as_str)
    }

    /// Next topic given the topic history in `store`. `None` only for an
    /// empty topic list.
    pub fn next<S: HistoryStore + ?Sized>(&self, store: &S) -> Option<String> {
        let recent = store.recent(HistoryKind::Topic, self.window);
        let pick = self.pick(&recent).map(str::to_string);
        debug!(target: "rotation", ?pick, window = self.window, "cyclic pick");
        pick
    }
}

/// What the scheduler hands to the generator.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicChoice {
    Topic(String),
    Entry(CatalogEntry),
    Exhausted,
}

impl TopicChoice {
    /// Label to prompt with, and to store as the item's topic.
    pub fn label(&self) -> Option<String> {
        match self {
            TopicChoice::Topic(t) => Some(t.clone()),
            TopicChoice::Entry(e) => Some(e.key()),
            TopicChoice::Exhausted => None,
        }
    }

    pub fn prompt_label(&self) -> Option<String> {
        match self {
            TopicChoice::Topic(t) => Some(t.clone()),
            TopicChoice::Entry(e) => Some(e.prompt_label()),
            TopicChoice::Exhausted => None,
        }
    }
}

/// Policy selected by configuration.
#[derive(Debug, Clone)]
pub enum Rotation {
    Exhaustion(ExhaustionScheduler),
    Cyclic(CyclicScheduler),
}

impl Rotation {
    /// Build from config; exhaustion mode loads `catalog_path` or the seed.
    pub fn from_config(cfg: &NoveltyConfig) -> Result<Self> {
        Ok(match cfg.rotation {
            RotationMode::Exhaustion => {
                let catalog = match &cfg.catalog_path {
                    Some(p) => Catalog::load_from(p)?,
                    None => Catalog::default_seed(),
                };
                Rotation::Exhaustion(ExhaustionScheduler::new(catalog))
            }
            RotationMode::Cyclic => {
                Rotation::Cyclic(CyclicScheduler::new(cfg.topics.clone(), cfg.recency_window))
            }
        })
    }

    pub fn next<S, R>(&self, store: &mut S, rng: &mut R) -> Result<TopicChoice>
    where
        S: HistoryStore + UsedSetStore + ?Sized,
        R: Rng,
    {
        match self {
            Rotation::Exhaustion(s) => Ok(s
                .next(store, rng)?
                .map(TopicChoice::Entry)
                .unwrap_or(TopicChoice::Exhausted)),
            Rotation::Cyclic(s) => Ok(s
                .next(store)
                .map(TopicChoice::Topic)
                .unwrap_or(TopicChoice::Exhausted)),
        }
    }
}
