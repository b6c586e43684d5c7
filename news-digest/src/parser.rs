use crate::types::{CollectorError, FeedEntry, Result};
use chrono::Utc;
use feed_rs::parser;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    /// Newest first; entries without a timestamp come last.
    pub entries: Vec<FeedEntry>,
}

/// Normalizes RSS, Atom and JSON Feed documents into [`FeedEntry`] values.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed(&self, content: &[u8]) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| CollectorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);

        let mut seen_guids = HashSet::new();
        let mut seen_links = HashSet::new();
        let mut entries = Vec::with_capacity(feed.entries.len());

        for entry in feed.entries {
            let parsed = Self::parse_entry(entry);

            if let Some(ref guid) = parsed.guid {
                if !seen_guids.insert(guid.clone()) {
                    debug!("Skipping duplicate entry with GUID: {}", guid);
                    continue;
                }
            }
            if let Some(ref link) = parsed.link {
                if !seen_links.insert(link.clone()) {
                    debug!("Skipping duplicate entry with URL: {}", link);
                    continue;
                }
            }

            entries.push(parsed);
        }

        // Stable, so documents that are already newest-first keep their order
        entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        debug!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> FeedEntry {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        let guid = if entry.id.is_empty() { None } else { Some(entry.id) };
        let link = entry.links.first().map(|l| l.href.clone());

        let summary = entry.summary.map(|s| s.content);
        // Full content wins over the summary
        let body = entry
            .content
            .and_then(|c| c.body)
            .or(summary)
            .unwrap_or_default();

        let author = entry
            .authors
            .first()
            .map(|a| a.name.trim().to_string())
            .unwrap_or_default();

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc));

        FeedEntry {
            guid,
            link,
            title,
            author,
            body,
            published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <link>https://news.example.com/</link>
    <description>Example</description>
    <item>
      <title>Older story</title>
      <link>https://news.example.com/older</link>
      <guid>older</guid>
      <pubDate>Mon, 19 Oct 2026 08:00:00 +0200</pubDate>
      <description>older body</description>
    </item>
    <item>
      <title>Newer story</title>
      <link>https://news.example.com/newer</link>
      <guid>newer</guid>
      <pubDate>Mon, 19 Oct 2026 07:30:00 GMT</pubDate>
      <description>&lt;p&gt;newer body&lt;/p&gt;</description>
    </item>
    <item>
      <title>Newer story again</title>
      <link>https://news.example.com/newer</link>
      <guid>newer</guid>
      <pubDate>Mon, 19 Oct 2026 07:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Undated</title>
      <link>https://news.example.com/undated</link>
      <guid>undated</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Example</title>
  <id>urn:example:feed</id>
  <updated>2026-10-19T09:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <id>urn:example:1</id>
    <link href="https://atom.example.com/1"/>
    <updated>2026-10-19T09:00:00Z</updated>
    <author><name>Jo Writer</name></author>
    <content type="html">&lt;p&gt;full text&lt;/p&gt;</content>
    <summary>short</summary>
  </entry>
</feed>"#;

    #[test]
    fn rss_entries_are_normalized_to_utc_and_sorted_newest_first() {
        let parsed = FeedParser::new().parse_feed(RSS.as_bytes()).unwrap();

        assert_eq!(parsed.title.as_deref(), Some("Example News"));
        let titles: Vec<&str> = parsed.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer story", "Older story", "Undated"]);

        assert_eq!(
            parsed.entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 7, 30, 0).unwrap())
        );
        assert_eq!(
            parsed.entries[1].published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap())
        );
        assert_eq!(parsed.entries[2].published_at, None);
        assert_eq!(parsed.entries[0].body, "<p>newer body</p>");
        assert_eq!(parsed.entries[0].author, "");
    }

    #[test]
    fn atom_prefers_content_and_falls_back_to_updated() {
        let parsed = FeedParser::new().parse_feed(ATOM.as_bytes()).unwrap();
        let entry = &parsed.entries[0];

        assert_eq!(entry.title, "Atom entry");
        assert_eq!(entry.author, "Jo Writer");
        assert_eq!(entry.body, "<p>full text</p>");
        assert_eq!(entry.link.as_deref(), Some("https://atom.example.com/1"));
        assert_eq!(
            entry.published_at,
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = FeedParser::new().parse_feed(b"this is not a feed").unwrap_err();
        assert!(matches!(err, CollectorError::Parse(_)));
    }
}
