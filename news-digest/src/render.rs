use crate::types::{DigestDocument, DigestMap, FeedItem};
use crate::utils::time::{nice_date, nice_time, readable};
use chrono::{DateTime, TimeZone};
use html_escape::encode_text;
use std::fmt::{Display, Write};

/// Render the digest as a single HTML document, feeds in digest order.
///
/// Item times are shown in the timezone of `generated_at`. Feeds with no
/// items produce no output at all.
pub fn render_digest<Tz>(digest: &DigestMap, generated_at: &DateTime<Tz>) -> DigestDocument
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let title = format!("NEWS: {}", readable(generated_at));

    let mut html = String::new();
    html.push_str("<html>\n<head>\n  <meta charset=\"UTF-8\" />\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n");
    let _ = writeln!(html, "  <title>{}</title>\n</head>\n<body>", encode_text(&title));

    for collection in digest.iter().filter(|c| !c.items.is_empty()) {
        let _ = writeln!(
            html,
            "<br pagebreak=\"always\"><h1>{}</h1>",
            encode_text(&collection.feed)
        );
        for item in &collection.items {
            render_item(&mut html, item, &generated_at.timezone());
        }
    }

    html.push_str("</body>\n</html>\n");

    DigestDocument {
        name: generated_at.format("%Y%m%d%H%M").to_string(),
        title,
        html,
        item_count: digest.total_items(),
    }
}

fn render_item<Tz>(html: &mut String, item: &FeedItem, tz: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let published = item.published_at.with_timezone(tz);
    let byline = if item.author.trim().is_empty() {
        format!("For <i>{}</i>", encode_text(&item.source_feed))
    } else {
        format!(
            "By {} for <i>{}</i>",
            encode_text(item.author.trim()),
            encode_text(&item.source_feed)
        )
    };

    let _ = write!(
        html,
        "<article>\n  <h2>{}</h2>\n  <p><small>{}, on {} at {}.</small></p>\n  {}\n  <hr />\n</article>\n",
        encode_text(&item.title),
        byline,
        nice_date(&published),
        nice_time(&published),
        item.body
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedCollection;
    use chrono::Utc;

    fn item(feed: &str, title: &str, author: &str, hour: u32) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            author: author.to_string(),
            body: format!("<p>{} body</p>", title),
            published_at: Utc.with_ymd_and_hms(2026, 10, 19, hour, 5, 0).unwrap(),
            source_feed: feed.to_string(),
            link: None,
        }
    }

    fn digest() -> DigestMap {
        DigestMap::new(vec![
            FeedCollection {
                feed: "https://b.example/rss".to_string(),
                items: vec![item("https://b.example/rss", "Tom & Jerry", "Ann <ann@b>", 6)],
            },
            FeedCollection {
                feed: "https://empty.example/rss".to_string(),
                items: Vec::new(),
            },
            FeedCollection {
                feed: "https://a.example/rss".to_string(),
                items: vec![
                    item("https://a.example/rss", "First", "", 7),
                    item("https://a.example/rss", "Second", "", 8),
                ],
            },
        ])
    }

    #[test]
    fn sections_follow_digest_order_and_escape_text() {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let doc = render_digest(&digest(), &generated_at);

        assert_eq!(doc.name, "202610190930");
        assert_eq!(doc.item_count, 3);

        let b = doc.html.find("https://b.example/rss</h1>").unwrap();
        let a = doc.html.find("https://a.example/rss</h1>").unwrap();
        assert!(b < a);
        assert!(doc.html.find("First").unwrap() < doc.html.find("Second").unwrap());

        assert!(doc.html.contains("<h2>Tom &amp; Jerry</h2>"));
        assert!(doc.html.contains("By Ann &lt;ann@b&gt; for"));
        assert!(doc.html.contains("<p>First body</p>"));
        assert!(doc.html.contains("on 19 October 2026 at 7:05 am."));
    }

    #[test]
    fn empty_collections_render_like_absent_feeds() {
        let generated_at = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let with_empty = render_digest(&digest(), &generated_at);

        let without_empty = DigestMap::new(
            digest()
                .iter()
                .filter(|c| !c.items.is_empty())
                .cloned()
                .collect(),
        );
        assert_eq!(with_empty.html, render_digest(&without_empty, &generated_at).html);
        assert!(!with_empty.html.contains("empty.example"));
    }
}
