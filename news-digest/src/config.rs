use crate::types::{CollectorConfig, CollectorError, FetchConfig, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// One year.
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 365;
pub const MAX_RETRY_DELAY_SECS: u64 = 3600;
pub const MAX_FEED_SIZE_MB: usize = 1024;

/// Collect new items from a list of feeds into a single HTML digest.
#[derive(Debug, Clone, Parser)]
#[command(name = "news-digest", version)]
pub struct Config {
    /// Feed list, one address per line
    #[arg(long, env = "NEWS_DIGEST_FEEDS", default_value = "/config/feeds.txt")]
    pub feeds_file: PathBuf,

    /// Where the collection cursor is kept
    #[arg(long, env = "NEWS_DIGEST_CURSOR", default_value = "/lastpulled.json")]
    pub cursor_file: PathBuf,

    /// Directory the rendered digest is written to
    #[arg(long, env = "NEWS_DIGEST_OUTPUT", default_value = ".")]
    pub output_dir: PathBuf,

    /// Window collected when no cursor is stored yet
    #[arg(long, env = "NEWS_DIGEST_LOOKBACK_HOURS", default_value_t = 6)]
    pub lookback_hours: i64,

    /// Upper bound on one feed's retrieval, retries included
    #[arg(long, env = "NEWS_DIGEST_FEED_TIMEOUT", default_value_t = 45)]
    pub feed_timeout_secs: u64,

    /// Timeout of a single HTTP request
    #[arg(long, env = "NEWS_DIGEST_HTTP_TIMEOUT", default_value_t = 30)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "NEWS_DIGEST_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    #[arg(long, env = "NEWS_DIGEST_RETRY_DELAY", default_value_t = 2)]
    pub retry_delay_secs: u64,

    #[arg(long, env = "NEWS_DIGEST_MAX_FEED_MB", default_value_t = 10)]
    pub max_feed_size_mb: usize,

    #[arg(long, env = "NEWS_DIGEST_USER_AGENT", default_value = "news-digest/0.1")]
    pub user_agent: String,

    /// Keep the cursor where it is when every feed failed
    #[arg(long, env = "NEWS_DIGEST_HOLD_CURSOR")]
    pub hold_cursor_on_total_failure: bool,

    /// Collect and render without delivering or advancing the cursor
    #[arg(long)]
    pub dry_run: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LOOKBACK_HOURS).contains(&self.lookback_hours) {
            return Err(CollectorError::Config(format!(
                "lookback must be between 1 and {}h, got {}h",
                MAX_LOOKBACK_HOURS, self.lookback_hours
            )));
        }
        if self.feed_timeout_secs == 0 {
            return Err(CollectorError::Config("feed timeout must be positive".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(CollectorError::Config("HTTP timeout must be positive".to_string()));
        }
        if !(1..=MAX_FEED_SIZE_MB).contains(&self.max_feed_size_mb) {
            return Err(CollectorError::Config(format!(
                "max feed size must be between 1 and {}MB, got {}MB",
                MAX_FEED_SIZE_MB, self.max_feed_size_mb
            )));
        }
        if self.retry_delay_secs > MAX_RETRY_DELAY_SECS {
            return Err(CollectorError::Config(format!(
                "retry delay must be at most {}s, got {}s",
                MAX_RETRY_DELAY_SECS, self.retry_delay_secs
            )));
        }
        Ok(())
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout_seconds: self.http_timeout_secs,
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            max_feed_size_mb: self.max_feed_size_mb,
            ..FetchConfig::default()
        }
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            feed_timeout: Duration::from_secs(self.feed_timeout_secs),
            hold_cursor_on_total_failure: self.hold_cursor_on_total_failure,
        }
    }

    /// Clamped to the validated range, so an unvalidated config cannot overflow.
    pub fn default_lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours.clamp(1, MAX_LOOKBACK_HOURS))
    }
}
