use crate::aggregator::FeedSlot;
use crate::types::{FeedEntry, FeedItem, FeedOutcome, FeedReport, FeedSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retrieval and time-window filtering for one feed.
pub struct FeedWorker {
    source: Arc<dyn FeedSource>,
    timeout: Duration,
}

impl FeedWorker {
    pub fn new(source: Arc<dyn FeedSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetch the slot's feed, keep what was published after `cursor` and
    /// append it oldest first. Failures are reported, never raised.
    pub async fn run(&self, slot: FeedSlot, cursor: DateTime<Utc>) -> FeedReport {
        let feed = slot.feed().to_string();

        let outcome = match tokio::time::timeout(self.timeout, self.source.fetch(&feed)).await {
            Ok(Ok(entries)) => {
                let items = select_new_items(&feed, entries, cursor);
                let count = items.len();
                slot.append(items).await;
                FeedOutcome::Collected { items: count }
            }
            Ok(Err(e)) => {
                warn!("Failed to collect feed {}: {:#}", feed, e);
                FeedOutcome::Failed {
                    reason: format!("{:#}", e),
                }
            }
            Err(_) => {
                warn!("Feed {} timed out after {:?}", feed, self.timeout);
                FeedOutcome::TimedOut
            }
        };

        FeedReport { feed, outcome }
    }
}

/// Items strictly newer than `cursor`, oldest first.
///
/// `entries` are expected newest first. Entries without a timestamp are
/// dropped. The final stable sort keeps the result chronological even when a
/// source does not honour that order.
pub fn select_new_items(feed: &str, entries: Vec<FeedEntry>, cursor: DateTime<Utc>) -> Vec<FeedItem> {
    let total = entries.len();

    let mut items: Vec<FeedItem> = entries
        .into_iter()
        .filter_map(|entry| FeedItem::from_entry(entry, feed))
        .collect();
    let undated = total - items.len();
    if undated > 0 {
        debug!("Dropped {} undated entries from {}", undated, feed);
    }

    items.retain(|item| item.published_at > cursor);
    items.reverse();
    items.sort_by_key(|item| item.published_at);
    items
}
