//! File-backed history: one flat file per projection inside `state_dir`.
//!
//! ```text
//! state/
//!   sent_titles.txt    one title per line
//!   sent_bodies.txt    bodies separated by BODY_SEPARATOR
//!   sent_topics.txt    one topic per line
//!   sent_hashes.json   [{"hash": "..", "source": "..", "date": "YYYY-MM-DD"}]
//!   used_topics.txt    one catalog key per line
//! ```
//!
//! Reads are full scans on every call; the window is tens of items, not
//! millions. Single writer assumed, no locking.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{single_line, wants_hash_record, HashRecord, HistoryKind, HistoryStore, UsedSetStore};
use crate::item::ContentItem;

pub const TITLES_FILE: &str = "sent_titles.txt";
pub const BODIES_FILE: &str = "sent_bodies.txt";
pub const TOPICS_FILE: &str = "sent_topics.txt";
pub const HASHES_FILE: &str = "sent_hashes.json";
pub const USED_FILE: &str = "used_topics.txt";

const SEPARATOR_MARK: &str = "-----8<-----";

/// Line that separates bodies in `sent_bodies.txt`. The mark itself is
/// removed from bodies before they are written.
pub const BODY_SEPARATOR: &str = "\n-----8<-----\n";

#[derive(Debug, Clone)]
pub struct FileHistory {
    dir: PathBuf,
}

impl FileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating state dir {}", self.dir.display()))
    }

    fn append_raw(&self, name: &str, chunk: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path(name);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        f.write_all(chunk.as_bytes())
            .with_context(|| format!("appending to {}", path.display()))
    }

    fn read_lines(&self, name: &str) -> Vec<String> {
        read_optional(&self.path(name))
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn read_bodies(&self) -> Vec<String> {
        read_optional(&self.path(BODIES_FILE))
            .split(BODY_SEPARATOR)
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn write_hashes(&self, records: &[HashRecord]) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path(HASHES_FILE);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(records).context("serializing hash history")?;
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

impl HistoryStore for FileHistory {
    fn append(&mut self, item: &ContentItem) -> Result<()> {
        self.append_raw(TITLES_FILE, &format!("{}\n", single_line(&item.title)))?;
        let body = item.body.replace(SEPARATOR_MARK, "");
        self.append_raw(BODIES_FILE, &format!("{}{}", body.trim(), BODY_SEPARATOR))?;
        if let Some(topic) = &item.topic {
            self.append_raw(TOPICS_FILE, &format!("{}\n", single_line(topic)))?;
        }
        if wants_hash_record(item) {
            let mut records = self.hash_records();
            records.push(HashRecord::from_item(item));
            self.write_hashes(&records)?;
        }
        Ok(())
    }

    fn entries(&self, kind: HistoryKind) -> Vec<String> {
        match kind {
            HistoryKind::Title => self.read_lines(TITLES_FILE),
            HistoryKind::Body => self.read_bodies(),
            HistoryKind::Topic => self.read_lines(TOPICS_FILE),
            HistoryKind::Hash => self.hash_records().into_iter().map(|r| r.hash).collect(),
        }
    }

    fn hash_records(&self) -> Vec<HashRecord> {
        let path = self.path(HASHES_FILE);
        let raw = read_optional(&path);
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(target: "history", path = %path.display(), error = %e, "corrupt hash history, treating as empty");
                Vec::new()
            }
        }
    }
}

impl UsedSetStore for FileHistory {
    fn used(&self) -> HashSet<String> {
        self.read_lines(USED_FILE).into_iter().collect()
    }

    fn mark_used(&mut self, key: &str) -> Result<()> {
        self.append_raw(USED_FILE, &format!("{}\n", single_line(key)))
    }
}

/// File contents, or "" when missing/unreadable.
fn read_optional(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            tracing::warn!(target: "history", path = %path.display(), error = %e, "unreadable state file, treating as empty");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, body: &str) -> ContentItem {
        ContentItem::new(title, body)
    }

    #[test]
    fn missing_dir_is_empty_history() {
        let tmp = tempfile::tempdir().unwrap();
        let h = FileHistory::new(tmp.path().join("never-created"));
        assert!(h.entries(HistoryKind::Title).is_empty());
        assert!(h.hash_records().is_empty());
        assert!(h.used().is_empty());
        assert!(!h.contains_exact(HistoryKind::Title, "anything"));
    }

    #[test]
    fn multi_line_bodies_round_trip_as_blocks() {
        let tmp = tempfile::tempdir().unwrap();
        let mut h = FileHistory::new(tmp.path());
        h.append(&item("One", "line a\nline b\n\nline c")).unwrap();
        h.append(&item("Two", "second body")).unwrap();
        let bodies = h.entries(HistoryKind::Body);
        assert_eq!(bodies, vec!["line a\nline b\n\nline c".to_string(), "second body".into()]);
    }

    #[test]
    fn titles_are_flattened_to_one_line() {
        let tmp = tempfile::tempdir().unwrap();
        let mut h = FileHistory::new(tmp.path());
        h.append(&item("Broken\ntitle", "b")).unwrap();
        assert_eq!(h.entries(HistoryKind::Title), vec!["Broken title".to_string()]);
    }

    #[test]
    fn corrupt_hash_file_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(HASHES_FILE), "{not json").unwrap();
        let h = FileHistory::new(tmp.path());
        assert!(h.hash_records().is_empty());
    }

    #[test]
    fn hash_record_written_only_for_linked_or_sourced_items() {
        let tmp = tempfile::tempdir().unwrap();
        let mut h = FileHistory::new(tmp.path());
        h.append(&item("Lesson", "body")).unwrap();
        assert!(h.hash_records().is_empty());
        h.append(&item("News", "sum").with_source("Verge").with_link("https://v.test/1"))
            .unwrap();
        let recs = h.hash_records();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].source, "Verge");
    }
}
