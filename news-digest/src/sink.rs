use crate::types::{DigestDocument, DigestSink};
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Writes each digest as `<name>.html` into a directory.
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, document: &DigestDocument) -> PathBuf {
        self.output_dir.join(format!("{}.html", document.name))
    }
}

#[async_trait]
impl DigestSink for FileSink {
    async fn deliver(&self, document: &DigestDocument) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let path = self.path_for(document);
        tokio::fs::write(&path, document.html.as_bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        info!("Wrote digest with {} items to {}", document.item_count, path.display());
        Ok(())
    }
}
