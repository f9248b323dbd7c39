// tests/file_history.rs
//
// File-backed history seen from a second process: a fresh FileHistory over
// the same directory must observe everything the first one wrote.

use std::fs;

use chrono::NaiveDate;

use fresh_digest::gate::{NoveltyGate, Rejection, Verdict};
use fresh_digest::history::file::{BODIES_FILE, HASHES_FILE, TITLES_FILE};
use fresh_digest::history::{FileHistory, HistoryKind, HistoryStore};
use fresh_digest::ContentItem;

#[test]
fn appends_are_visible_to_a_new_instance() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state");

    {
        let mut writer = FileHistory::new(&state);
        writer
            .append(&ContentItem::new("Lesson one", "Line 1\nLine 2\n\nLine 4").with_topic("Forms"))
            .unwrap();
        writer
            .append(
                &ContentItem::new("Article", "summary")
                    .with_link("https://n.test/1")
                    .with_source("News")
                    .dated(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            )
            .unwrap();
    }

    let reader = FileHistory::new(&state);
    assert_eq!(reader.entries(HistoryKind::Title), vec!["Lesson one", "Article"]);
    assert_eq!(reader.recent(HistoryKind::Body, 1), vec!["summary"]);
    assert_eq!(reader.entries(HistoryKind::Body)[0], "Line 1\nLine 2\n\nLine 4");
    assert_eq!(reader.entries(HistoryKind::Topic), vec!["Forms"]);

    let records = reader.hash_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "News");
    assert_eq!(records[0].date.to_string(), "2025-06-01");

    for f in [TITLES_FILE, BODIES_FILE, HASHES_FILE] {
        assert!(state.join(f).exists(), "{f} written");
    }
    assert!(!state.join("sent_hashes.json.tmp").exists());
}

#[test]
fn gate_reads_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileHistory::new(dir.path());
    store.append(&ContentItem::new("Dark patterns in checkout", "b")).unwrap();

    let gate = NoveltyGate::default();
    assert_eq!(
        gate.evaluate(&ContentItem::new("Dark patterns in checkout", "other"), &store),
        Verdict::Reject(Rejection::ExactTitle)
    );
    assert!(gate.is_novel(&ContentItem::new("Accessible color contrast", "other"), &store));
}

#[test]
fn hand_edited_hash_file_without_source_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(HASHES_FILE),
        r#"[{"hash": "abc", "date": "2025-05-30"}]"#,
    )
    .unwrap();
    let store = FileHistory::new(dir.path());
    let records = store.hash_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "");
    assert!(store.contains_exact(HistoryKind::Hash, "abc"));
}

#[test]
fn body_containing_the_separator_stays_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileHistory::new(dir.path());
    store
        .append(&ContentItem::new("Scissors", "before\n-----8<-----\nafter"))
        .unwrap();
    store.append(&ContentItem::new("Next", "plain")).unwrap();

    let bodies = FileHistory::new(dir.path()).entries(HistoryKind::Body);
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], "before\n\nafter");
    assert_eq!(bodies[1], "plain");
}
