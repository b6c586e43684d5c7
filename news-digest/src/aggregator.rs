use crate::types::{DigestMap, FeedCollection, FeedItem};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Shared accumulation point for worker results.
///
/// A single lock guards the whole map. Each `append` holds it only for the
/// extend and a log line, so a batch for one feed is never interleaved with
/// another batch for the same feed.
#[derive(Clone, Default)]
pub struct Aggregator {
    posts: Arc<Mutex<HashMap<String, Vec<FeedItem>>>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an oldest-first batch of items under `feed`.
    ///
    /// Empty batches leave the map untouched.
    pub async fn append(&self, feed: &str, items: Vec<FeedItem>) {
        let count = items.len();
        let mut posts = self.posts.lock().await;

        if count > 0 {
            posts.entry(feed.to_string()).or_default().extend(items);
        }

        info!("Downloaded {} posts from {}", count, feed);
    }

    /// Write handle bound to a single feed, handed to that feed's worker.
    pub fn slot(&self, feed: &str) -> FeedSlot {
        FeedSlot {
            feed: feed.to_string(),
            aggregator: self.clone(),
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.lock().await.is_empty()
    }

    /// Take the accumulated map, ordered by `feed_order`.
    ///
    /// Feeds that never received an item are left out; anything appended
    /// under an address missing from `feed_order` goes last, sorted by address.
    pub async fn drain_ordered(&self, feed_order: &[String]) -> DigestMap {
        let mut posts = std::mem::take(&mut *self.posts.lock().await);

        let mut collections: Vec<FeedCollection> = feed_order
            .iter()
            .filter_map(|feed| {
                posts.remove(feed).map(|items| FeedCollection {
                    feed: feed.clone(),
                    items,
                })
            })
            .collect();

        let mut leftovers: Vec<FeedCollection> = posts
            .into_iter()
            .map(|(feed, items)| FeedCollection { feed, items })
            .collect();
        leftovers.sort_by(|a, b| a.feed.cmp(&b.feed));
        collections.extend(leftovers);

        DigestMap::new(collections)
    }
}

/// Appends only under the feed it was created for.
pub struct FeedSlot {
    feed: String,
    aggregator: Aggregator,
}

impl FeedSlot {
    pub fn feed(&self) -> &str {
        &self.feed
    }

    pub async fn append(&self, items: Vec<FeedItem>) {
        self.aggregator.append(&self.feed, items).await;
    }
}
