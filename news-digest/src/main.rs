use clap::Parser;
use news_digest::{
    Collector, Config, CursorStore, DigestPipeline, FileCursorPersistence, FileSink, HttpFeedSource,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        "Feeds from {}, cursor at {}, output to {}",
        config.feeds_file.display(),
        config.cursor_file.display(),
        config.output_dir.display()
    );

    let source = Arc::new(HttpFeedSource::new(config.fetch_config())?);
    let collector = Collector::new(source, config.collector_config());
    let cursor_store = CursorStore::new(
        Arc::new(FileCursorPersistence::new(&config.cursor_file)),
        config.default_lookback(),
    );
    let sink = Arc::new(FileSink::new(&config.output_dir));

    let pipeline = DigestPipeline::new(&config.feeds_file, collector, cursor_store, sink)
        .dry_run(config.dry_run);

    match pipeline.run_once(chrono::Utc::now()).await {
        Ok(summary) => {
            for report in summary.reports.iter().filter(|r| r.outcome.is_failure()) {
                info!("  {}: {:?}", report.feed, report.outcome);
            }
            info!(
                "{} items from {} feeds, document: {}, cursor advanced: {}",
                summary.total_items,
                summary.reports.len(),
                summary.document.as_deref().unwrap_or("none"),
                summary.cursor_advanced()
            );
            Ok(())
        }
        Err(e) => {
            error!("Run aborted, cursor left untouched: {}", e);
            Err(e.into())
        }
    }
}
