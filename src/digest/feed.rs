// src/digest/feed.rs
//! Feed sources: RSS 2.0 and Atom, over HTTP or from a fixture string.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;
use tracing::debug;

/// One raw candidate article.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub source_name: String,
    pub published: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn new(title: &str, link: &str, summary: &str, source_name: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            summary: summary.to_string(),
            source_name: source_name.to_string(),
            published: None,
        }
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
    /// URL or fixture label, for logs.
    fn origin(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    pub items_per_feed: usize,
    pub summary_chars: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            items_per_feed: 3,
            summary_chars: 600,
        }
    }
}

pub struct RssFeed {
    origin: String,
    mode: Mode,
    opts: FeedOptions,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

impl RssFeed {
    pub fn from_url(url: &str, client: reqwest::Client, opts: FeedOptions) -> Self {
        Self {
            origin: url.trim().to_string(),
            mode: Mode::Http(client),
            opts,
        }
    }

    /// Parse an in-memory document; `origin` stands in for the URL.
    pub fn from_fixture_str(origin: &str, xml: &str, opts: FeedOptions) -> Self {
        Self {
            origin: origin.to_string(),
            mode: Mode::Fixture(xml.to_string()),
            opts,
        }
    }
}

#[async_trait]
impl FeedSource for RssFeed {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s, &self.origin, self.opts),
            Mode::Http(client) => {
                let body = client
                    .get(&self.origin)
                    .send()
                    .await
                    .with_context(|| format!("GET {}", self.origin))?
                    .error_for_status()
                    .with_context(|| format!("GET {} non-2xx", self.origin))?
                    .text()
                    .await
                    .with_context(|| format!("reading body of {}", self.origin))?;
                parse_feed(&body, &self.origin, self.opts)
            }
        }
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<TextNode>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Parse RSS or Atom into at most `items_per_feed` items, in feed order.
/// Items without a title or link are skipped.
pub fn parse_feed(xml: &str, origin: &str, opts: FeedOptions) -> Result<Vec<FeedItem>> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(xml);

    let (source_name, raw) = if looks_like_rss(&xml) {
        let rss: Rss = from_str(&xml).with_context(|| format!("parsing rss from {origin}"))?;
        let name = rss.channel.title.unwrap_or_default();
        let raw: Vec<_> = rss
            .channel
            .items
            .into_iter()
            .map(|it| {
                (
                    it.title.unwrap_or_default(),
                    it.link.unwrap_or_default(),
                    it.description.unwrap_or_default(),
                    it.pub_date.as_deref().and_then(parse_rfc2822),
                )
            })
            .collect();
        (name, raw)
    } else {
        let atom: AtomFeed = from_str(&xml).with_context(|| format!("parsing atom from {origin}"))?;
        let name = atom.title.map(|t| t.value).unwrap_or_default();
        let raw: Vec<_> = atom
            .entries
            .into_iter()
            .map(|e| {
                let link = pick_atom_link(&e.links);
                let summary = e.summary.or(e.content).map(|t| t.value).unwrap_or_default();
                let date = e
                    .published
                    .as_deref()
                    .or(e.updated.as_deref())
                    .and_then(parse_rfc3339);
                (e.title.map(|t| t.value).unwrap_or_default(), link, summary, date)
            })
            .collect();
        (name, raw)
    };

    let source_name = {
        let n = normalize_text(&source_name, 120);
        if n.is_empty() {
            host_of(origin)
        } else {
            n
        }
    };

    let out: Vec<FeedItem> = raw
        .into_iter()
        .filter_map(|(title, link, summary, published)| {
            let title = normalize_text(&title, 300);
            let link = link.trim().to_string();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(FeedItem {
                title,
                link,
                summary: normalize_text(&summary, opts.summary_chars),
                source_name: source_name.clone(),
                published,
            })
        })
        .take(opts.items_per_feed)
        .collect();

    histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("feed_items_total").increment(out.len() as u64);
    debug!(target: "feed", origin, source = %source_name, items = out.len(), "parsed");
    Ok(out)
}

fn looks_like_rss(xml: &str) -> bool {
    let head: String = xml.chars().take(2_000).collect();
    head.contains("<rss") || head.contains("<channel")
}

fn pick_atom_link(links: &[AtomLink]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
        .unwrap_or_default()
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc3339)
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
}

/// `https://www.example.com/feed` -> `www.example.com`.
/// Anything that does not parse as a URL is returned as given.
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.trim().to_string())
}

/// HTML entities that are not valid XML would abort the whole parse.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

/// Normalize feed text: decode entities, strip tags, fold quotes and
/// whitespace, cap at `max_chars` chars.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    out = out.split_whitespace().collect::<Vec<_>>().join(" ");

    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect::<String>().trim_end().to_string();
    }
    out
}
