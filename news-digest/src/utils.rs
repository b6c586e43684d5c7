/// URL helpers for feed addresses
pub mod url {
    use url::Url;

    /// Extract domain from URL
    pub fn extract_domain(url_str: &str) -> Option<String> {
        Url::parse(url_str).ok()?.domain().map(|d| d.to_string())
    }

    /// Only http(s) addresses can be retrieved
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        match Url::parse(url_str) {
            Ok(url) => url.scheme() == "http" || url.scheme() == "https",
            Err(_) => false,
        }
    }
}

/// Human-readable timestamps for digests
pub mod time {
    use chrono::{DateTime, Duration, TimeZone};
    use std::fmt::Display;

    /// `19 October 2026`, without a leading zero on the day
    pub fn nice_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        dt.format("%-d %B %Y").to_string()
    }

    /// `6:05 am`
    pub fn nice_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        dt.format("%-I:%M %P").to_string()
    }

    /// `06:05AM on Monday 19 October, 2026`
    pub fn readable<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        dt.format("%H:%M%p on %A %d %B, %Y").to_string()
    }

    /// Format duration in human-readable form
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.num_seconds();

        if total_seconds < 60 {
            format!("{}s", total_seconds)
        } else if total_seconds < 3600 {
            format!("{}m", total_seconds / 60)
        } else if total_seconds < 86400 {
            format!("{}h", total_seconds / 3600)
        } else {
            format!("{}d", total_seconds / 86400)
        }
    }
}
