//! In-memory history with the same semantics as the file store.

use std::collections::HashSet;

use anyhow::Result;

use super::{single_line, wants_hash_record, HashRecord, HistoryKind, HistoryStore, UsedSetStore};
use crate::item::ContentItem;

#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    titles: Vec<String>,
    bodies: Vec<String>,
    topics: Vec<String>,
    hashes: Vec<HashRecord>,
    used: HashSet<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed titles only (handy for gate tests).
    pub fn with_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Seed a raw hash record, e.g. one written on an earlier day.
    pub fn push_hash_record(&mut self, record: HashRecord) {
        self.hashes.push(record);
    }

    /// Seed a topic into the topic projection.
    pub fn push_topic(&mut self, topic: impl Into<String>) {
        self.topics.push(topic.into());
    }

    /// Total number of admitted items (title projection length).
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, item: &ContentItem) -> Result<()> {
        self.titles.push(single_line(&item.title));
        self.bodies.push(item.body.trim().to_string());
        if let Some(topic) = &item.topic {
            self.topics.push(single_line(topic));
        }
        if wants_hash_record(item) {
            self.hashes.push(HashRecord::from_item(item));
        }
        Ok(())
    }

    fn entries(&self, kind: HistoryKind) -> Vec<String> {
        match kind {
            HistoryKind::Title => self.titles.clone(),
            HistoryKind::Body => self.bodies.clone(),
            HistoryKind::Topic => self.topics.clone(),
            HistoryKind::Hash => self.hashes.iter().map(|r| r.hash.clone()).collect(),
        }
    }

    fn hash_records(&self) -> Vec<HashRecord> {
        self.hashes.clone()
    }
}

impl UsedSetStore for MemoryHistory {
    fn used(&self) -> HashSet<String> {
        self.used.clone()
    }

    fn mark_used(&mut self, key: &str) -> Result<()> {
        self.used.insert(single_line(key));
        Ok(())
    }
}
