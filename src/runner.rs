//! One scheduled run: lesson (rotation → retry → publish) or digest
//! (feeds → gate → penalty → summarize → publish).
//!
//! Every normal outcome, including "nothing to send", is a [`RunStatus`].
//! Only a failed UsedSet mark surfaces as an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::{BotConfig, NoveltyConfig};
use crate::digest::{build_digest, DigestParams, FeedOptions, FeedSource, RssFeed};
use crate::gate::{GateParams, NoveltyGate};
use crate::generate::{GenerationRequest, Generator, OpenAiClient, Summarizer};
use crate::history::{FileHistory, StateStore};
use crate::metrics::mark_run_finished;
use crate::publish::{publish_with_fallback, Publisher, PublishOutcome, TelegramPublisher, DIGEST_HEADER, LESSON_HEADER};
use crate::retry::{produce_novel, Production, RetryParams};
use crate::rotation::{Rotation, TopicChoice};

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    LessonSent { title: String, plain: bool },
    DigestSent { items: usize, plain: bool },
    /// Digest found no fresh article.
    NothingNew,
    /// Curriculum fully consumed.
    CatalogExhausted,
    /// Every generation attempt was a repeat or failed.
    NoNovelItem { attempts: usize },
    PublishFailed,
}

impl RunStatus {
    pub fn published(&self) -> bool {
        matches!(self, RunStatus::LessonSent { .. } | RunStatus::DigestSent { .. })
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::LessonSent { title, plain } => {
                write!(f, "Lesson sent: {title}")?;
                if *plain {
                    write!(f, " (plain text)")?;
                }
                Ok(())
            }
            RunStatus::DigestSent { items, plain } => {
                write!(f, "Digest sent with {items} article(s)")?;
                if *plain {
                    write!(f, " (plain text)")?;
                }
                Ok(())
            }
            RunStatus::NothingNew => write!(f, "Nothing new to send."),
            RunStatus::CatalogExhausted => write!(f, "All topics covered, nothing left to send."),
            RunStatus::NoNovelItem { attempts } => {
                write!(f, "No suitable item found after {attempts} attempt(s).")
            }
            RunStatus::PublishFailed => write!(f, "Sending failed."),
        }
    }
}

/// Collaborators and state for lesson and digest runs.
pub struct Runner {
    gate: NoveltyGate,
    rotation: Rotation,
    retry: RetryParams,
    digest: DigestParams,
    store: Box<dyn StateStore>,
    generator: Arc<dyn Generator>,
    summarizer: Arc<dyn Summarizer>,
    publisher: Arc<dyn Publisher>,
    feeds: Vec<Box<dyn FeedSource>>,
    rng: StdRng,
}

impl Runner {
    pub fn new(
        cfg: &NoveltyConfig,
        store: Box<dyn StateStore>,
        generator: Arc<dyn Generator>,
        summarizer: Arc<dyn Summarizer>,
        publisher: Arc<dyn Publisher>,
        feeds: Vec<Box<dyn FeedSource>>,
    ) -> Result<Self> {
        Ok(Self {
            gate: NoveltyGate::new(GateParams::from(cfg)),
            rotation: Rotation::from_config(cfg).context("building rotation")?,
            retry: RetryParams::from(cfg),
            digest: DigestParams::from(cfg),
            store,
            generator,
            summarizer,
            publisher,
            feeds,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Production wiring: file state, OpenAI, Telegram, configured feeds.
    pub fn from_config(cfg: &NoveltyConfig, bot: &BotConfig) -> Result<Self> {
        let openai = Arc::new(OpenAiClient::new(bot)?);
        let http = reqwest::Client::builder()
            .user_agent("fresh-digest/0.1")
            .timeout(Duration::from_secs(20))
            .build()
            .context("building feed client")?;
        let opts = FeedOptions {
            items_per_feed: cfg.items_per_feed,
            summary_chars: cfg.summary_chars,
        };
        let feeds: Vec<Box<dyn FeedSource>> = cfg
            .feeds
            .iter()
            .map(|url| Box::new(RssFeed::from_url(url, http.clone(), opts)) as Box<dyn FeedSource>)
            .collect();
        Self::new(
            cfg,
            Box::new(FileHistory::new(&cfg.state_dir)),
            openai.clone(),
            openai,
            Arc::new(TelegramPublisher::from_config(bot)),
            feeds,
        )
    }

    /// Deterministic topic picks (tests).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &dyn StateStore {
        &*self.store
    }

    pub async fn run_lesson(&mut self) -> Result<RunStatus> {
        self.run_lesson_on(Utc::now().date_naive()).await
    }

    pub async fn run_lesson_on(&mut self, today: NaiveDate) -> Result<RunStatus> {
        let choice = self.rotation.next(&mut *self.store, &mut self.rng)?;
        if choice == TopicChoice::Exhausted {
            mark_run_finished();
            return Ok(RunStatus::CatalogExhausted);
        }
        info!(target: "rotation", topic = ?choice.label(), "topic chosen");

        let request = GenerationRequest::for_topic(choice.prompt_label());
        let production = produce_novel(
            &request,
            self.generator.as_ref(),
            &self.gate,
            &mut *self.store,
            self.retry,
        )
        .await;

        let status = match production {
            Production::Exhausted { attempts } => RunStatus::NoNovelItem { attempts },
            Production::Admitted { item, .. } => {
                match publish_with_fallback(self.publisher.as_ref(), LESSON_HEADER, today, &item.body).await {
                    PublishOutcome::Failed => RunStatus::PublishFailed,
                    outcome => RunStatus::LessonSent {
                        title: item.title,
                        plain: outcome == PublishOutcome::SentPlain,
                    },
                }
            }
        };
        mark_run_finished();
        info!(target: "publish", %status, "lesson run finished");
        Ok(status)
    }

    pub async fn run_digest(&mut self) -> RunStatus {
        self.run_digest_on(Utc::now().date_naive()).await
    }

    pub async fn run_digest_on(&mut self, today: NaiveDate) -> RunStatus {
        let digest = build_digest(
            &self.feeds,
            self.summarizer.as_ref(),
            &self.gate,
            &mut *self.store,
            &self.digest,
            today,
        )
        .await;

        let status = if digest.is_empty() {
            RunStatus::NothingNew
        } else {
            match publish_with_fallback(self.publisher.as_ref(), DIGEST_HEADER, today, &digest.text()).await {
                PublishOutcome::Failed => RunStatus::PublishFailed,
                outcome => RunStatus::DigestSent {
                    items: digest.sections.len(),
                    plain: outcome == PublishOutcome::SentPlain,
                },
            }
        };
        mark_run_finished();
        info!(target: "publish", %status, failed_feeds = digest.failed_feeds, "digest run finished");
        status
    }
}
