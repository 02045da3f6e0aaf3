//! Crypto news ingestion
//!
//! Articles come from a fixed set of RSS feeds, or from a JSON file of
//! previously fetched news for offline runs.

pub mod feed;

use crate::config::{FeedConfig, NewsConfig};
use crate::error::Result;
use crate::storage;
use crate::types::NewsItem;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed::FeedEntry;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{error, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SUMMARY_CHARS: usize = 200;

/// Source of news articles for one pipeline run
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles published within the last `hours`, newest first
    async fn fetch_news(&self, hours: i64) -> Result<Vec<NewsItem>>;

    fn name(&self) -> &str;
}

/// On-disk shape of `news_raw.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSnapshot {
    pub news: Vec<NewsItem>,
    pub fetched_at: String,
    pub total_count: usize,
}

impl NewsSnapshot {
    pub fn new(news: Vec<NewsItem>) -> Self {
        Self {
            total_count: news.len(),
            news,
            fetched_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Merge per-feed entries into a deduplicated, newest-first article list.
///
/// Entries older than `cutoff` are dropped; undated entries are kept and sort
/// after dated ones. The first occurrence of a title wins.
pub fn collect_news(feeds: Vec<(String, Vec<FeedEntry>)>, cutoff: DateTime<Utc>) -> Vec<NewsItem> {
    let mut seen_titles = HashSet::new();
    let mut dated: Vec<(Option<DateTime<Utc>>, NewsItem)> = Vec::new();

    for (source, entries) in feeds {
        for entry in entries {
            if matches!(entry.published, Some(p) if p < cutoff) {
                continue;
            }
            let title = entry.title.trim().to_string();
            if title.is_empty() || !seen_titles.insert(title.clone()) {
                continue;
            }
            dated.push((
                entry.published,
                NewsItem {
                    title,
                    link: entry.link,
                    published_at: entry.published.map(|p| p.to_rfc3339()),
                    source: source.clone(),
                    summary: entry.summary.chars().take(SUMMARY_CHARS).collect(),
                },
            ));
        }
    }

    // Stable sort, so equal timestamps keep feed order
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().map(|(_, item)| item).collect()
}

/// Fetches the configured RSS feeds
pub struct RssNewsFetcher {
    http: Client,
    feeds: Vec<FeedConfig>,
}

impl RssNewsFetcher {
    pub fn new(config: &NewsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            feeds: config.feeds.clone(),
        })
    }

    async fn fetch_feed(&self, feed: &FeedConfig) -> Result<Vec<FeedEntry>> {
        let resp = self.http.get(&feed.url).send().await?;
        let body = crate::client::retry::check_status(resp).await?.text().await?;
        Ok(feed::parse_feed(&body))
    }
}

#[async_trait]
impl NewsSource for RssNewsFetcher {
    async fn fetch_news(&self, hours: i64) -> Result<Vec<NewsItem>> {
        let cutoff = Utc::now() - Duration::hours(hours);
        info!("Fetching news from last {} hours...", hours);

        let mut per_feed = Vec::new();
        for feed in &self.feeds {
            info!("Fetching from {}...", feed.name);
            match self.fetch_feed(feed).await {
                Ok(entries) => {
                    info!("  Found {} entries from {}", entries.len(), feed.name);
                    per_feed.push((feed.name.clone(), entries));
                }
                Err(e) => {
                    error!("Failed to fetch from {}: {}", feed.name, e);
                }
            }
        }

        let news = collect_news(per_feed, cutoff);
        info!("Total news fetched: {}", news.len());
        Ok(news)
    }

    fn name(&self) -> &str {
        "rss"
    }
}

/// Reads articles from a JSON file (`news_raw.json` shape or a bare array)
pub struct FileNewsSource {
    path: PathBuf,
}

impl FileNewsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NewsFile {
    Snapshot { news: Vec<NewsItem> },
    List(Vec<NewsItem>),
}

#[async_trait]
impl NewsSource for FileNewsSource {
    async fn fetch_news(&self, hours: i64) -> Result<Vec<NewsItem>> {
        let file: NewsFile = storage::load_json(&self.path).await?;
        let news = match file {
            NewsFile::Snapshot { news } => news,
            NewsFile::List(news) => news,
        };
        let cutoff = Utc::now() - Duration::hours(hours);

        let entries = news
            .into_iter()
            .map(|item| FeedEntry {
                published: item
                    .published_at
                    .as_deref()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|d| d.with_timezone(&Utc)),
                title: item.title,
                link: item.link,
                summary: item.summary,
            })
            .collect();

        let news = collect_news(vec![(self.name().to_string(), entries)], cutoff);
        info!("Loaded {} news items from {}", news.len(), self.path.display());
        Ok(news)
    }

    fn name(&self) -> &str {
        "file"
    }
}
