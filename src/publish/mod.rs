//! Outbound publishing. One rich attempt, then one degraded plain retry.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;
use tracing::{info, warn};

pub use telegram::TelegramPublisher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    /// Degraded form: no emoji header, no link-preview flag.
    pub plain: bool,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &Message) -> Result<()>;
}

/// Message header: `{emoji} {label} – dd.mm.yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub emoji: &'static str,
    pub label: &'static str,
}

pub const LESSON_HEADER: Header = Header {
    emoji: "📘",
    label: "UX Lesson",
};

pub const DIGEST_HEADER: Header = Header {
    emoji: "📬",
    label: "Tech & UX Digest",
};

pub fn compose(header: Header, date: NaiveDate, body: &str) -> Message {
    Message {
        text: format!("{} {} – {}\n\n{}", header.emoji, header.label, date.format("%d.%m.%Y"), body.trim()),
        plain: false,
    }
}

pub fn compose_plain(header: Header, date: NaiveDate, body: &str) -> Message {
    Message {
        text: format!("{} – {}\n\n{}", header.label, date.format("%d.%m.%Y"), body.trim()),
        plain: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent,
    SentPlain,
    Failed,
}

impl PublishOutcome {
    pub fn delivered(self) -> bool {
        !matches!(self, PublishOutcome::Failed)
    }
}

/// Publish `body` under `header`; on failure retry once in plain form.
/// Never returns an error: failures are logged and counted.
pub async fn publish_with_fallback<P: Publisher + ?Sized>(
    publisher: &P,
    header: Header,
    date: NaiveDate,
    body: &str,
) -> PublishOutcome {
    match publisher.publish(&compose(header, date, body)).await {
        Ok(()) => {
            info!(target: "publish", label = header.label, "sent");
            return PublishOutcome::Sent;
        }
        Err(e) => warn!(target: "publish", error = %e, "send failed, retrying as plain text"),
    }
    match publisher.publish(&compose_plain(header, date, body)).await {
        Ok(()) => {
            info!(target: "publish", label = header.label, "sent plain");
            PublishOutcome::SentPlain
        }
        Err(e) => {
            counter!("publish_failures_total").increment(1);
            warn!(target: "publish", error = %e, "plain send failed");
            PublishOutcome::Failed
        }
    }
}
