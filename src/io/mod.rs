mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalSource;

use anyhow::Result;
use async_trait::async_trait;

/// An uploaded file held entirely in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name used to detect the format
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Trait for loading an upload from a data source
#[async_trait]
pub trait Source: Send + Sync {
    /// Human-readable location of the source, for messages
    fn name(&self) -> &str;

    /// Read the whole source, failing once more than `max_bytes` would be read
    async fn load(&self, max_bytes: u64) -> Result<Upload>;
}

/// Last path segment of a file path or URL path.
pub(crate) fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of("letters/3월 안내.hwpx"), "3월 안내.hwpx");
        assert_eq!(file_name_of(r"C:\docs\form.hwp"), "form.hwp");
        assert_eq!(file_name_of("/files/template.hwpx/"), "template.hwpx");
        assert_eq!(file_name_of("plain.pdf"), "plain.pdf");
    }
}
