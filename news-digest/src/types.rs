use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
// Boundary types shared with collaborators
pub use interfaces::defs::{CursorPersistence, DigestDocument, DigestSink, FeedEntry, FeedSource};

/// One accepted item, tagged with the feed it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub author: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub source_feed: String,
    pub link: Option<String>,
}

impl FeedItem {
    /// Entries without a timestamp cannot be placed against the cursor and yield `None`.
    pub fn from_entry(entry: FeedEntry, source_feed: &str) -> Option<Self> {
        let published_at = entry.published_at?;
        Some(Self {
            title: entry.title,
            author: entry.author,
            body: entry.body,
            published_at,
            source_feed: source_feed.to_string(),
            link: entry.link,
        })
    }
}

/// Items of a single feed, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCollection {
    pub feed: String,
    pub items: Vec<FeedItem>,
}

/// Per-feed collections in feed-list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigestMap {
    collections: Vec<FeedCollection>,
}

impl DigestMap {
    pub fn new(collections: Vec<FeedCollection>) -> Self {
        Self { collections }
    }

    pub fn get(&self, feed: &str) -> Option<&[FeedItem]> {
        self.collections
            .iter()
            .find(|c| c.feed == feed)
            .map(|c| c.items.as_slice())
    }

    pub fn contains_feed(&self, feed: &str) -> bool {
        self.get(feed).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedCollection> {
        self.collections.iter()
    }

    pub fn feeds(&self) -> Vec<&str> {
        self.collections.iter().map(|c| c.feed.as_str()).collect()
    }

    /// Number of feeds present, including any with an empty collection.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }

    pub fn total_items(&self) -> usize {
        self.collections.iter().map(|c| c.items.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedOutcome {
    Collected { items: usize },
    Failed { reason: String },
    TimedOut,
}

impl FeedOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, FeedOutcome::Collected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReport {
    pub feed: String,
    pub outcome: FeedOutcome,
}

#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub digest: DigestMap,
    /// Reports in feed-list order.
    pub reports: Vec<FeedReport>,
    /// Whether the caller may advance the cursor.
    pub attempted_completion: bool,
}

impl CollectionOutcome {
    pub fn failed_feeds(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failure()).count()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// First backoff interval; later ones double up to 32x this.
    pub retry_delay: Duration,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "news-digest/0.1".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Upper bound on one worker's retrieval, retries included.
    pub feed_timeout: Duration,
    /// Hold the cursor when every feed in a non-empty list failed.
    pub hold_cursor_on_total_failure: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            feed_timeout: Duration::from_secs(45),
            hold_cursor_on_total_failure: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Feed list error: {0}")]
    FeedList(String),

    #[error("Cursor store error: {0}")]
    Cursor(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("General error: {0}")]
    General(String),
}

impl CollectorError {
    /// Systemic errors abort the run and leave the cursor where it was.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            CollectorError::FeedList(_)
                | CollectorError::Cursor(_)
                | CollectorError::Dispatch(_)
                | CollectorError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;
