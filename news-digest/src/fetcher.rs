use crate::types::{CollectorError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// HTTP retrieval of raw feed documents.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the document at `url`, retrying transient failures with exponential backoff.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<u8>> {
        let start_time = Instant::now();
        let parsed = Url::parse(url)?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(CollectorError::General(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        debug!("Fetching feed: {}", url);

        // Attempts are bounded by max_retries, total time by the worker timeout
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: self.config.retry_delay,
            initial_interval: self.config.retry_delay,
            max_interval: self.config.retry_delay.saturating_mul(32),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.fetch_once(parsed.as_str()).await {
                Ok(body) => {
                    info!(
                        "Fetched feed: {} ({} bytes in {}ms)",
                        url,
                        body.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(body);
                }
                // Oversized documents will not shrink on retry
                Err(e @ CollectorError::FeedTooLarge { .. }) => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);
        Err(last_error.unwrap_or_else(|| CollectorError::General("Unknown fetch error".to_string())))
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CollectorError::General(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            self.check_size(usize::try_from(content_length).unwrap_or(usize::MAX))?;
        }

        let body = read_body(response).await?;
        // Content-Length may be absent or wrong for chunked responses
        self.check_size(body.len())?;
        Ok(body)
    }

    fn check_size(&self, bytes: usize) -> Result<()> {
        let limit = self.config.max_feed_size_mb.saturating_mul(1024 * 1024);
        if bytes > limit {
            return Err(CollectorError::FeedTooLarge {
                size_mb: bytes / (1024 * 1024),
            });
        }
        Ok(())
    }
}

async fn read_body(response: Response) -> Result<Vec<u8>> {
    Ok(response.bytes().await?.to_vec())
}
