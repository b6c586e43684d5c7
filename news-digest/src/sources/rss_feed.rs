use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::types::{FeedEntry, FeedSource, FetchConfig, Result};
use crate::utils::url::extract_domain;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Feed source backed by HTTP retrieval and `feed-rs` parsing.
#[derive(Clone)]
pub struct HttpFeedSource {
    fetcher: Arc<Fetcher>,
    parser: FeedParser,
}

impl HttpFeedSource {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Arc::new(Fetcher::new(fetch_config)?),
            parser: FeedParser::new(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, address: &str) -> anyhow::Result<Vec<FeedEntry>> {
        let content = self.fetcher.fetch_feed(address).await?;
        let parsed = self.parser.parse_feed(&content)?;

        let name = parsed
            .title
            .or_else(|| extract_domain(address))
            .unwrap_or_else(|| "untitled feed".to_string());
        info!("Pulled {} entries from {} ({})", parsed.entries.len(), name, address);
        Ok(parsed.entries)
    }
}
