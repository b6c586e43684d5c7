use crate::collector::Collector;
use crate::cursor::CursorStore;
use crate::feed_list::load_feeds;
use crate::render::render_digest;
use crate::types::{CollectorError, DigestSink, FeedReport, Result};
use crate::utils::time::{format_duration, readable};
use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What one run did, for logging and for callers embedding the pipeline.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub cursor_before: DateTime<Utc>,
    /// Stored cursor after the run; `None` when it was left untouched.
    pub cursor_after: Option<DateTime<Utc>>,
    pub reports: Vec<FeedReport>,
    pub total_items: usize,
    /// Name of the delivered (or, in a dry run, rendered) document.
    pub document: Option<String>,
}

impl RunSummary {
    pub fn cursor_advanced(&self) -> bool {
        self.cursor_after.is_some()
    }
}

/// Cursor read, collection, rendering, delivery and cursor write for one run.
pub struct DigestPipeline {
    feeds_file: PathBuf,
    collector: Collector,
    cursor_store: CursorStore,
    sink: Arc<dyn DigestSink>,
    dry_run: bool,
}

impl DigestPipeline {
    pub fn new(
        feeds_file: impl Into<PathBuf>,
        collector: Collector,
        cursor_store: CursorStore,
        sink: Arc<dyn DigestSink>,
    ) -> Self {
        Self {
            feeds_file: feeds_file.into(),
            collector,
            cursor_store,
            sink,
            dry_run: false,
        }
    }

    /// Collect and render only: nothing is delivered and the cursor stays put.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run once with `now` as the run start.
    ///
    /// Any error returned here is systemic and leaves the cursor untouched.
    /// On success the cursor moves to `now`, so anything published while the
    /// run was in flight is looked at again next time.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let local_now = now.with_timezone(&Local);
        info!("Starting at {}...", readable(&local_now));

        let cursor_before = self.cursor_store.read(now).await?;
        info!(
            "Collecting posts since {} ({} ago)",
            readable(&cursor_before.with_timezone(&Local)),
            format_duration(now - cursor_before)
        );

        let feeds = load_feeds(&self.feeds_file).await?;
        if feeds.is_empty() {
            warn!("Feed list {} is empty", self.feeds_file.display());
        }

        let outcome = self.collector.collect(&feeds, cursor_before).await;
        let total_items = outcome.digest.total_items();

        let document = if outcome.digest.is_empty() {
            info!("No new items since the last run, nothing to deliver");
            None
        } else {
            info!("Compiling {} items...", total_items);
            let document = render_digest(&outcome.digest, &local_now);
            if self.dry_run {
                info!("Dry run, not delivering {}", document.name);
            } else {
                self.sink
                    .deliver(&document)
                    .await
                    .map_err(|e| CollectorError::Dispatch(format!("{:#}", e)))?;
            }
            Some(document.name)
        };

        let cursor_after = if self.dry_run {
            None
        } else if !outcome.attempted_completion {
            warn!("Holding cursor at {}", cursor_before.to_rfc3339());
            None
        } else {
            Some(self.cursor_store.write(now).await?)
        };

        info!("Finished!");

        Ok(RunSummary {
            started_at: now,
            cursor_before,
            cursor_after,
            reports: outcome.reports,
            total_items,
            document,
        })
    }
}
