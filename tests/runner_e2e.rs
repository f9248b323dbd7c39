// tests/runner_e2e.rs
//
// Whole runs through `Runner` with scripted collaborators: no network,
// history in memory or in a temp dir.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use fresh_digest::digest::{FeedItem, FeedOptions, FeedSource, RssFeed};
use fresh_digest::generate::{Draft, GenerationRequest, Generator, Summarizer};
use fresh_digest::history::{FileHistory, HistoryKind, HistoryStore, MemoryHistory};
use fresh_digest::publish::{Message, Publisher};
use fresh_digest::{NoveltyConfig, RotationMode, RunStatus, Runner};

const UX_RSS: &str = include_str!("fixtures/ux_rss.xml");

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
}

/// Numbered lessons on the requested topic; never repeats.
#[derive(Default)]
struct Numbered {
    n: Mutex<usize>,
    topics: Mutex<Vec<Option<String>>>,
}

#[async_trait]
impl Generator for Numbered {
    async fn generate(&self, request: &GenerationRequest) -> Result<Draft> {
        let mut n = self.n.lock().unwrap();
        *n += 1;
        self.topics.lock().unwrap().push(request.topic.clone());
        let topic = request.topic.clone().unwrap_or_default();
        Ok(Draft {
            title: format!("{topic} lesson {n}"),
            body: format!("{}{}", "x".repeat(*n * 10), topic),
        })
    }

    fn name(&self) -> &'static str {
        "numbered"
    }
}

struct EchoFirst;

#[async_trait]
impl Summarizer for EchoFirst {
    async fn summarize(&self, _source: &str, items: &[FeedItem]) -> Result<String> {
        Ok(format!("Title: {}\nSource: {}", items[0].title, items[0].link))
    }
}

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<Message>>,
    fail_all: bool,
}

#[async_trait]
impl Publisher for Recorder {
    async fn publish(&self, message: &Message) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail_all {
            bail!("telegram down");
        }
        Ok(())
    }
}

fn ux_feed() -> Vec<Box<dyn FeedSource>> {
    vec![Box::new(RssFeed::from_fixture_str("https://uxdesign.cc/feed", UX_RSS, FeedOptions::default()))]
}

fn cyclic_config() -> NoveltyConfig {
    NoveltyConfig {
        rotation: RotationMode::Cyclic,
        topics: vec!["Forms".into(), "Navigation".into()],
        recency_window: 1,
        ..NoveltyConfig::default()
    }
}

#[tokio::test]
async fn lesson_run_rotates_topics_and_publishes_with_header() {
    let generator = Arc::new(Numbered::default());
    let publisher = Arc::new(Recorder::default());
    let mut runner = Runner::new(
        &cyclic_config(),
        Box::new(MemoryHistory::new()),
        generator.clone(),
        Arc::new(EchoFirst),
        publisher.clone(),
        Vec::new(),
    )
    .unwrap();

    let first = runner.run_lesson_on(day()).await.unwrap();
    let second = runner.run_lesson_on(day()).await.unwrap();
    assert!(first.published() && second.published());

    let topics = generator.topics.lock().unwrap().clone();
    assert_eq!(topics, vec![Some("Forms".to_string()), Some("Navigation".to_string())]);
    assert_eq!(
        runner.store().entries(HistoryKind::Topic),
        vec!["Forms".to_string(), "Navigation".to_string()]
    );

    let sent = publisher.sent.lock().unwrap();
    assert!(sent[0].text.starts_with("📘 UX Lesson – 03.06.2025\n\n"));
    assert!(!sent[0].plain);
}

#[tokio::test]
async fn curriculum_run_ends_in_catalog_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(&catalog, "[Research]\nBeginner = [\"Interviews\"]\n").unwrap();

    let cfg = NoveltyConfig {
        rotation: RotationMode::Exhaustion,
        catalog_path: Some(catalog),
        ..NoveltyConfig::default()
    };
    let state = dir.path().join("state");
    let mut runner = Runner::new(
        &cfg,
        Box::new(FileHistory::new(&state)),
        Arc::new(Numbered::default()),
        Arc::new(EchoFirst),
        Arc::new(Recorder::default()),
        Vec::new(),
    )
    .unwrap()
    .with_seed(9);

    let first = runner.run_lesson_on(day()).await.unwrap();
    assert!(matches!(first, RunStatus::LessonSent { .. }), "{first}");
    assert_eq!(runner.run_lesson_on(day()).await.unwrap(), RunStatus::CatalogExhausted);

    let used = std::fs::read_to_string(state.join("used_topics.txt")).unwrap();
    assert_eq!(used.trim(), "Research > Beginner > Interviews");
}

#[tokio::test]
async fn publish_failure_is_a_status_not_an_error() {
    let publisher = Arc::new(Recorder {
        fail_all: true,
        ..Recorder::default()
    });
    let mut runner = Runner::new(
        &cyclic_config(),
        Box::new(MemoryHistory::new()),
        Arc::new(Numbered::default()),
        Arc::new(EchoFirst),
        publisher.clone(),
        Vec::new(),
    )
    .unwrap();

    assert_eq!(runner.run_lesson_on(day()).await.unwrap(), RunStatus::PublishFailed);
    let sent = publisher.sent.lock().unwrap();
    assert_eq!(sent.len(), 2, "one rich attempt, one plain fallback");
    assert!(sent[1].plain);
    assert!(sent[1].text.starts_with("UX Lesson – 03.06.2025"));
}

#[tokio::test]
async fn digest_run_sends_once_then_reports_nothing_new() {
    let publisher = Arc::new(Recorder::default());
    let cfg = NoveltyConfig {
        irrelevant_keywords: vec!["deal".into()],
        ..NoveltyConfig::default()
    };
    let mut runner = Runner::new(
        &cfg,
        Box::new(MemoryHistory::new()),
        Arc::new(Numbered::default()),
        Arc::new(EchoFirst),
        publisher.clone(),
        ux_feed(),
    )
    .unwrap();

    let status = runner.run_digest_on(day()).await;
    assert_eq!(status, RunStatus::DigestSent { items: 1, plain: false });
    {
        let sent = publisher.sent.lock().unwrap();
        assert!(sent[0].text.starts_with("📬 Tech & UX Digest – 03.06.2025\n\nTitle: Designing empty states"));
    }

    // Next run: the first item is known, the other relevant one is still new.
    let status = runner.run_digest_on(day()).await;
    assert_eq!(status, RunStatus::DigestSent { items: 1, plain: false });
    assert_eq!(runner.run_digest_on(day()).await, RunStatus::NothingNew);
    assert_eq!(publisher.sent.lock().unwrap().len(), 2);
}
