// tests/novelty_gate.rs
//
// Gate behaviour against an in-memory history:
// - empty history admits any titled candidate
// - exact and fuzzy title repeats are rejected
// - strict `>` at the threshold
// - body similarity and the seen-hash check

use fresh_digest::gate::{GateParams, NoveltyGate, Rejection, Verdict};
use fresh_digest::history::{HashRecord, HistoryStore, MemoryHistory};
use fresh_digest::similarity::ratio;
use fresh_digest::ContentItem;

#[test]
fn empty_history_admits_everything_titled() {
    let gate = NoveltyGate::default();
    let store = MemoryHistory::new();
    for title in ["X", "Card sorting 101", "ÄÖÜ", "a much longer lesson title with many words"] {
        assert!(gate.is_novel(&ContentItem::new(title, "any body"), &store), "{title}");
    }
}

#[test]
fn exact_duplicate_title_is_rejected() {
    let gate = NoveltyGate::default();
    let store = MemoryHistory::with_titles(["X"]);
    assert!(!gate.is_novel(&ContentItem::new("X", "Y"), &store));
}

#[test]
fn near_duplicate_title_is_rejected() {
    assert!(ratio("improving onboarding flows", "improving the onboarding flow") > 0.8);

    let gate = NoveltyGate::default();
    let store = MemoryHistory::with_titles(["Improving Onboarding Flows"]);
    let verdict = gate.evaluate(&ContentItem::new("Improving the Onboarding Flow", "b"), &store);
    match verdict {
        Verdict::Reject(Rejection::SimilarTitle { score, matched }) => {
            assert!(score > 0.8);
            assert_eq!(matched, "Improving Onboarding Flows");
        }
        other => panic!("expected SimilarTitle, got {other:?}"),
    }
}

#[test]
fn score_equal_to_threshold_is_not_a_repeat() {
    // ratio("abcd", "abcx") == 0.75 exactly, the default body threshold.
    assert_eq!(ratio("abcd", "abcx"), 0.75);

    let gate = NoveltyGate::default();
    let mut store = MemoryHistory::new();
    store.append(&ContentItem::new("Old lesson", "abcx")).unwrap();

    assert!(gate.is_novel(&ContentItem::new("New lesson", "abcd"), &store));

    let strict = NoveltyGate::new(GateParams {
        body_threshold: 0.74,
        ..GateParams::default()
    });
    assert_eq!(
        strict.evaluate(&ContentItem::new("New lesson", "abcd"), &store),
        Verdict::Reject(Rejection::SimilarBody { score: 0.75 })
    );
}

#[test]
fn body_check_is_case_sensitive() {
    let gate = NoveltyGate::default();
    let mut store = MemoryHistory::new();
    store
        .append(&ContentItem::new("Old", "Dark patterns hurt trust"))
        .unwrap();
    // Same text in upper case shares almost no matching chars.
    assert!(gate.is_novel(&ContentItem::new("Fresh", "DARK PATTERNS HURT TRUST"), &store));
    assert!(!gate.is_novel(&ContentItem::new("Fresh", "Dark patterns hurt trust!"), &store));
}

#[test]
fn seen_article_is_rejected_by_hash() {
    let gate = NoveltyGate::default();
    let sent = ContentItem::new("Browser vendors agree on API", "old summary")
        .with_link("https://v.test/a/2")
        .with_source("The Verge");

    // Only the hash projection knows about the article.
    let mut store = MemoryHistory::new();
    store.push_hash_record(HashRecord::from_item(&sent));

    let again = ContentItem::new(" Browser vendors agree on API ", "rewritten summary")
        .with_link("https://v.test/a/2 ");
    assert_eq!(gate.evaluate(&again, &store), Verdict::Reject(Rejection::SeenHash));

    let elsewhere = ContentItem::new("Browser vendors agree on API", "x").with_link("https://other.test/");
    assert!(gate.is_novel(&elsewhere, &store));

    // Lessons carry no link, so the hash check does not apply to them.
    let lesson = ContentItem::new("Browser vendors agree on API", "x");
    assert!(gate.is_novel(&lesson, &store));
}

#[test]
fn unrelated_titles_pass() {
    let gate = NoveltyGate::default();
    let store = MemoryHistory::with_titles(["Dark patterns in checkout"]);
    assert!(gate.is_novel(&ContentItem::new("Accessible color contrast", "body"), &store));
}
