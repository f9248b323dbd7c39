//! # History Store
//! Append-only record of what was already published, kept as independent
//! projections (titles, bodies, topics, content hashes) that are written
//! together when an item is admitted.
//!
//! Two implementations share the same semantics:
//! - [`FileHistory`]: flat files in a state directory, durable across runs.
//! - [`MemoryHistory`]: in-process vectors for tests and dry runs.
//!
//! Missing or unreadable state is an empty history, never an error. Nothing
//! is ever pruned.

pub mod file;
pub mod memory;

use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::item::ContentItem;

pub use file::FileHistory;
pub use memory::MemoryHistory;

/// Which projection of the history to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Title,
    Body,
    Topic,
    Hash,
}

/// One entry of the hash history (digest variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub hash: String,
    #[serde(default)]
    pub source: String,
    pub date: NaiveDate,
}

impl HashRecord {
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            hash: item.content_hash(),
            source: item.source.clone().unwrap_or_default(),
            date: item.published_at,
        }
    }
}

pub trait HistoryStore {
    /// Persist every relevant projection of `item`.
    fn append(&mut self, item: &ContentItem) -> Result<()>;

    /// All entries of one projection, oldest first.
    fn entries(&self, kind: HistoryKind) -> Vec<String>;

    /// Full hash history with source and date.
    fn hash_records(&self) -> Vec<HashRecord>;

    /// Last `n` entries of a projection, oldest first within the slice.
    fn recent(&self, kind: HistoryKind, n: usize) -> Vec<String> {
        let mut all = self.entries(kind);
        let start = all.len().saturating_sub(n);
        all.drain(..start);
        all
    }

    /// True iff `value` (trimmed) equals an existing entry (trimmed).
    fn contains_exact(&self, kind: HistoryKind, value: &str) -> bool {
        let needle = value.trim();
        self.entries(kind).iter().any(|e| e.trim() == needle)
    }
}

/// Durable set of consumed catalog paths (curriculum mode).
pub trait UsedSetStore {
    fn used(&self) -> HashSet<String>;
    fn mark_used(&mut self, key: &str) -> Result<()>;
}

/// Everything a run needs from persisted state.
pub trait StateStore: HistoryStore + UsedSetStore + Send {}

impl<T: HistoryStore + UsedSetStore + Send> StateStore for T {}

/// Whether an admitted item should leave a hash record.
pub(crate) fn wants_hash_record(item: &ContentItem) -> bool {
    item.link.is_some() || item.source.is_some()
}

/// Titles and topics are line records: no embedded newlines.
pub(crate) fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
