use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry as a feed source reports it, before any cursor filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub guid: Option<String>,
    pub link: Option<String>,
    pub title: String,
    pub author: String,
    pub body: String,
    /// `None` when the feed gave no usable timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

/// A rendered digest, ready to be handed to a sink.
#[derive(Clone, Debug, PartialEq)]
pub struct DigestDocument {
    /// Base file name without extension, e.g. `202610190600`.
    pub name: String,
    pub title: String,
    pub html: String,
    pub item_count: usize,
}

// Object style note:
// Implementations live outside the collection core and are injected into it.
// A source may be called from many tasks at once, so `fetch` takes `&self`
// and any caching it does must be internally synchronized.

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Retrieve and normalize the feed at `address`, newest entry first.
    async fn fetch(&self, address: &str) -> Result<Vec<FeedEntry>>;
}

#[async_trait]
pub trait CursorPersistence: Send + Sync {
    /// `Ok(None)` when nothing usable has been stored yet.
    async fn load(&self) -> Result<Option<DateTime<Utc>>>;
    async fn save(&self, collected_until: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
pub trait DigestSink: Send + Sync {
    async fn deliver(&self, document: &DigestDocument) -> Result<()>;
}
