pub mod mock;
pub mod rss_feed;

pub use mock::MockFeedSource;
pub use rss_feed::HttpFeedSource;
