use crate::aggregator::Aggregator;
use crate::types::{CollectionOutcome, CollectorConfig, FeedOutcome, FeedReport, FeedSource};
use crate::worker::FeedWorker;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fans one worker out per feed and joins them all into a single digest.
pub struct Collector {
    source: Arc<dyn FeedSource>,
    config: CollectorConfig,
}

impl Collector {
    pub fn new(source: Arc<dyn FeedSource>, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    /// Collect every feed in `feeds` concurrently against a fixed `cursor`.
    ///
    /// Returns only after the slowest worker has finished or timed out. Feed
    /// failures are folded into the reports; the digest and the reports both
    /// follow the order of `feeds`.
    pub async fn collect(&self, feeds: &[String], cursor: DateTime<Utc>) -> CollectionOutcome {
        let feeds = unique_feeds(feeds);
        let aggregator = Aggregator::new();
        let worker = Arc::new(FeedWorker::new(self.source.clone(), self.config.feed_timeout));

        info!("Collecting {} feeds published after {}", feeds.len(), cursor.to_rfc3339());

        let handles: Vec<_> = feeds
            .iter()
            .map(|feed| {
                let worker = worker.clone();
                let slot = aggregator.slot(feed);
                let handle = tokio::spawn(async move { worker.run(slot, cursor).await });
                (feed.clone(), handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (feed, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    error!("Worker for {} did not finish: {}", feed, e);
                    FeedReport {
                        feed,
                        outcome: FeedOutcome::Failed {
                            reason: format!("worker aborted: {}", e),
                        },
                    }
                }
            };
            reports.push(report);
        }

        let digest = aggregator.drain_ordered(&feeds).await;

        let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
        let all_failed = !reports.is_empty() && failed == reports.len();
        if all_failed {
            warn!("Every feed failed this run ({} feeds)", reports.len());
        }

        info!(
            "Collected {} items from {}/{} feeds",
            digest.total_items(),
            reports.len() - failed,
            reports.len()
        );

        CollectionOutcome {
            digest,
            reports,
            attempted_completion: !(all_failed && self.config.hold_cursor_on_total_failure),
        }
    }
}

fn unique_feeds(feeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(feeds.len());
    for feed in feeds {
        if seen.insert(feed.as_str()) {
            unique.push(feed.clone());
        } else {
            warn!("Ignoring duplicate feed {}", feed);
        }
    }
    unique
}
