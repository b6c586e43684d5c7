use crate::types::{CollectorError, Result};
use crate::utils::url::is_valid_feed_url;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Load feed addresses from a text file, one per line.
///
/// Blank lines and `#` comments are skipped and repeated addresses keep only
/// their first position.
pub async fn load_feeds(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CollectorError::FeedList(format!("{}: {}", path.display(), e)))?;

    let feeds = parse_feed_list(&content);
    info!("Loaded {} feeds from {}", feeds.len(), path.display());
    Ok(feeds)
}

pub fn parse_feed_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut feeds = Vec::new();

    for line in content.lines() {
        let address = line.trim();
        if address.is_empty() || address.starts_with('#') {
            continue;
        }
        if !seen.insert(address) {
            warn!("Duplicate feed in list: {}", address);
            continue;
        }
        if !is_valid_feed_url(address) {
            warn!("Feed address is not an http(s) URL: {}", address);
        }
        feeds.push(address.to_string());
    }

    feeds
}
