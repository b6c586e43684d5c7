use crate::types::{FeedEntry, FeedSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Script {
    Entries(Vec<FeedEntry>),
    Fail(String),
}

/// Scripted feed source for tests and offline runs.
///
/// Addresses that were never scripted fail like an unreachable host would.
#[derive(Default)]
pub struct MockFeedSource {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are handed back as given; callers provide them newest first.
    pub fn with_entries(mut self, address: &str, entries: Vec<FeedEntry>) -> Self {
        self.scripts.insert(address.to_string(), Script::Entries(entries));
        self
    }

    pub fn with_failure(mut self, address: &str, reason: &str) -> Self {
        self.scripts.insert(address.to_string(), Script::Fail(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch(&self, address: &str) -> anyhow::Result<Vec<FeedEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(address) {
            Some(Script::Entries(entries)) => Ok(entries.clone()),
            Some(Script::Fail(reason)) => Err(anyhow::anyhow!("{}", reason)),
            None => Err(anyhow::anyhow!("no route to {}", address)),
        }
    }
}
