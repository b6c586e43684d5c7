#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use news_digest::FeedEntry;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed reference instant used as the cursor in most tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap()
}

pub fn entry(title: &str, published_at: DateTime<Utc>) -> FeedEntry {
    FeedEntry {
        guid: Some(format!("urn:test:{}", title)),
        link: Some(format!("https://news.example.com/{}", title)),
        title: title.to_string(),
        author: "Test Desk".to_string(),
        body: format!("<p>{}</p>", title),
        published_at: Some(published_at),
    }
}

/// `count` entries one minute apart after `start`, newest first like a real feed.
pub fn entries_after(prefix: &str, start: DateTime<Utc>, count: usize) -> Vec<FeedEntry> {
    (1..=count)
        .rev()
        .map(|i| entry(&format!("{}-{}", prefix, i), start + Duration::minutes(i as i64)))
        .collect()
}

pub fn feeds(addresses: &[&str]) -> Vec<String> {
    addresses.iter().map(|a| a.to_string()).collect()
}
