use super::{Source, Upload, file_name_of};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::PathBuf;

/// Local file source
pub struct LocalSource {
    path: PathBuf,
    display: String,
}

impl LocalSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl Source for LocalSource {
    fn name(&self) -> &str {
        &self.display
    }

    async fn load(&self, max_bytes: u64) -> Result<Upload> {
        // Check the size before reading so oversized files are never buffered
        let size = tokio::fs::metadata(&self.path)
            .await
            .with_context(|| format!("cannot stat {}", self.display))?
            .len();
        if size > max_bytes {
            bail!("{} is {} bytes, larger than the {} byte limit", self.display, size, max_bytes);
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.display))?;
        tracing::info!(path = %self.display, bytes = bytes.len(), "loaded local file");

        Ok(Upload {
            file_name: file_name_of(&self.display),
            bytes,
        })
    }
}
