mod common;

use chrono::{TimeZone, Utc};
use common::init_tracing;
use news_digest::{CollectorError, FeedSource, FetchConfig, Fetcher, HttpFeedSource, Result};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Morning Wire</title>
    <link>https://wire.example.com</link>
    <description>Test wire</description>
    <item>
      <title>Second story</title>
      <link>https://wire.example.com/2</link>
      <guid>wire-2</guid>
      <pubDate>Mon, 19 Oct 2026 09:00:00 GMT</pubDate>
    </item>
    <item>
      <title>First story</title>
      <link>https://wire.example.com/1</link>
      <guid>wire-1</guid>
      <description>&lt;p&gt;Hello&lt;/p&gt;</description>
      <pubDate>Mon, 19 Oct 2026 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

fn fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_seconds: 5,
        max_retries: 2,
        retry_delay: Duration::from_millis(10),
        ..FetchConfig::default()
    }
}

async fn requests_to(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

#[tokio::test]
async fn test_transient_server_error_is_retried() -> Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RSS))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fetch_config())?;
    let body = fetcher.fetch_feed(&format!("{}/feed", server.uri())).await?;

    assert_eq!(body, RSS.as_bytes());
    assert_eq!(requests_to(&server).await, 2);
    Ok(())
}

#[tokio::test]
async fn test_persistent_client_error_exhausts_retries() -> Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(fetch_config())?;
    let err = fetcher
        .fetch_feed(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::General(ref msg) if msg.contains("HTTP 404")));
    assert_eq!(requests_to(&server).await, 3);
    Ok(())
}

#[tokio::test]
async fn test_oversized_feed_is_rejected_without_retry() -> Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b' '; 1024 * 1024 + 1]))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(FetchConfig {
        max_feed_size_mb: 1,
        ..fetch_config()
    })?;
    let err = fetcher
        .fetch_feed(&format!("{}/huge", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, CollectorError::FeedTooLarge { size_mb: 1 }));
    assert_eq!(requests_to(&server).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_non_http_scheme_is_rejected() -> Result<()> {
    init_tracing();

    let fetcher = Fetcher::new(fetch_config())?;
    let err = fetcher.fetch_feed("ftp://wire.example.com/feed").await.unwrap_err();

    assert!(matches!(err, CollectorError::General(ref msg) if msg.contains("scheme")));
    Ok(())
}

#[tokio::test]
async fn test_http_source_serves_parsed_entries() -> Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(RSS),
        )
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fetch_config())?;
    let entries = source
        .fetch(&format!("{}/rss", server.uri()))
        .await
        .map_err(|e| CollectorError::General(format!("{:#}", e)))?;

    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Second story", "First story"]);
    assert_eq!(
        entries[1].published_at,
        Some(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap())
    );
    assert!(entries[1].body.contains("Hello"));
    assert_eq!(entries[0].link.as_deref(), Some("https://wire.example.com/2"));
    Ok(())
}

#[tokio::test]
async fn test_http_source_reports_unparsable_documents() -> Result<()> {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>not a feed</body></html>"))
        .mount(&server)
        .await;

    let source = HttpFeedSource::new(fetch_config())?;
    assert!(source.fetch(&format!("{}/html", server.uri())).await.is_err());
    Ok(())
}
