// src/rotation/catalog.rs
//! Curriculum catalog: `category -> level -> [topic]`, expanded into flat
//! paths. Loaded from TOML or JSON; a built-in UX seed covers the no-file case.
//!
//! TOML shape:
//! ```toml
//! [Research.Beginner]
//! topics = ["Interviews", "Surveys"]
//! ```
//! JSON shape:
//! ```json
//! { "Research": { "Beginner": ["Interviews", "Surveys"] } }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Separator inside a catalog key.
pub const KEY_SEPARATOR: &str = " > ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogEntry {
    pub category: String,
    pub level: String,
    pub topic: String,
}

impl CatalogEntry {
    pub fn new(category: &str, level: &str, topic: &str) -> Self {
        Self {
            category: category.trim().to_string(),
            level: level.trim().to_string(),
            topic: topic.trim().to_string(),
        }
    }

    /// Durable identity in the UsedSet.
    pub fn key(&self) -> String {
        [&self.category, &self.level, &self.topic].map(|s| s.as_str()).join(KEY_SEPARATOR)
    }

    /// Human label used when prompting the generator.
    pub fn prompt_label(&self) -> String {
        format!("{} ({}, {})", self.topic, self.category, self.level)
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelSpec {
    List(Vec<String>),
    Table { topics: Vec<String> },
}

impl LevelSpec {
    fn into_topics(self) -> Vec<String> {
        match self {
            LevelSpec::List(v) => v,
            LevelSpec::Table { topics } => topics,
        }
    }
}

type RawCatalog = BTreeMap<String, BTreeMap<String, LevelSpec>>;

impl Catalog {
    /// Expand the hierarchy in deterministic (sorted category/level, listed
    /// topic) order. Blank names and duplicate paths are dropped.
    pub fn from_tree<I, L, T>(tree: I) -> Self
    where
        I: IntoIterator<Item = (String, L)>,
        L: IntoIterator<Item = (String, T)>,
        T: IntoIterator<Item = String>,
    {
        let mut entries = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (category, levels) in tree {
            for (level, topics) in levels {
                for topic in topics {
                    let e = CatalogEntry::new(&category, &level, &topic);
                    if e.category.is_empty() || e.level.is_empty() || e.topic.is_empty() {
                        continue;
                    }
                    if seen.insert(e.key()) {
                        entries.push(e);
                    }
                }
            }
        }
        Self { entries }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading catalog from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let raw: RawCatalog = if ext == "json" {
            serde_json::from_str(&content).context("parsing catalog json")?
        } else {
            toml::from_str(&content).context("parsing catalog toml")?
        };
        let catalog = Self::from_raw(raw);
        if catalog.is_empty() {
            return Err(anyhow!("catalog {} has no topics", path.display()));
        }
        Ok(catalog)
    }

    fn from_raw(raw: RawCatalog) -> Self {
        Self::from_tree(raw.into_iter().map(|(c, levels)| {
            (c, levels.into_iter().map(|(l, spec)| (l, spec.into_topics())))
        }))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Built-in UX curriculum.
    pub fn default_seed() -> Self {
        let tree: [(&str, [(&str, &[&str]); 3]); 3] = [
            (
                "UX Research",
                [
                    ("Beginner", &["User interviews", "Surveys", "Personas"]),
                    ("Intermediate", &["Usability testing", "Card sorting", "Diary studies"]),
                    ("Advanced", &["Research ops", "Mixed-methods synthesis"]),
                ],
            ),
            (
                "Interaction Design",
                [
                    ("Beginner", &["Affordances", "Feedback and system status", "Empty states"]),
                    ("Intermediate", &["Microinteractions", "Form design", "Error prevention"]),
                    ("Advanced", &["Design systems", "Motion as meaning"]),
                ],
            ),
            (
                "Accessibility",
                [
                    ("Beginner", &["Colour contrast", "Alt text"]),
                    ("Intermediate", &["Keyboard navigation", "Focus management"]),
                    ("Advanced", &["Screen reader testing", "Accessible data visualisation"]),
                ],
            ),
        ];
        Self::from_tree(tree.into_iter().map(|(c, levels)| {
            (
                c.to_string(),
                levels.into_iter().map(|(l, topics)| {
                    (l.to_string(), topics.iter().map(|t| t.to_string()).collect::<Vec<_>>())
                }),
            )
        }))
    }
}
