pub mod aggregator;
pub mod collector;
pub mod config;
pub mod cursor;
pub mod feed_list;
pub mod fetcher;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod sink;
pub mod sources;
pub mod types;
pub mod utils;
pub mod worker;

pub use types::*;
pub use aggregator::{Aggregator, FeedSlot};
pub use collector::Collector;
pub use config::Config;
pub use cursor::{CursorStore, FileCursorPersistence, InMemoryCursorPersistence};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use pipeline::{DigestPipeline, RunSummary};
pub use render::render_digest;
pub use sink::FileSink;
pub use sources::{HttpFeedSource, MockFeedSource};
pub use worker::FeedWorker;
