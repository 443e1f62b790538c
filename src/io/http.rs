use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{Source, Upload, file_name_of};
use anyhow::{Result, bail};

/// HTTP(S) source for uploads hosted remotely
pub struct HttpSource {
    client: Client,
    url: String,
    transferred_bytes: AtomicU64,
    max_retry: u32,
}

impl HttpSource {
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            url,
            transferred_bytes: AtomicU64::new(0),
            max_retry: 3,
        })
    }

    pub fn is_http_url(location: &str) -> bool {
        location.starts_with("http://") || location.starts_with("https://")
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    /// File name from the last path segment of the URL
    fn file_name(&self) -> String {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.url)
            .splitn(4, '/')
            .nth(3)
            .unwrap_or_default();
        file_name_of(path)
    }

    async fn get(&self) -> Result<reqwest::Response> {
        let mut retry_count = 0;

        loop {
            match self.client.get(&self.url).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }
                    return Ok(resp);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded: {}", e);
                    }
                    tracing::warn!(retry = retry_count, max = self.max_retry, error = %e, "connection error");
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl Source for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn load(&self, max_bytes: u64) -> Result<Upload> {
        let mut resp = self.get().await?;

        // Reject early when the server declares the size
        if let Some(len) = resp.content_length() {
            if len > max_bytes {
                bail!("remote file is {} bytes, larger than the {} byte limit", len, max_bytes);
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            self.transferred_bytes
                .fetch_add(chunk.len() as u64, Ordering::Relaxed);
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                bail!("remote file exceeds the {} byte limit", max_bytes);
            }
            bytes.extend_from_slice(&chunk);
        }
        tracing::info!(
            url = %self.url,
            bytes = bytes.len(),
            transferred = self.transferred_bytes(),
            "downloaded remote file"
        );

        Ok(Upload {
            file_name: self.file_name(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http_url() {
        assert!(HttpSource::is_http_url("https://example.com/a.hwpx"));
        assert!(HttpSource::is_http_url("http://example.com/a.hwpx"));
        assert!(!HttpSource::is_http_url("a.hwpx"));
        assert!(!HttpSource::is_http_url("ftp://example.com/a.hwpx"));
    }

    #[test]
    fn test_file_name_from_url() {
        let source = HttpSource::new("https://example.com/forms/notice.hwpx?dl=1".to_string()).unwrap();
        assert_eq!(source.file_name(), "notice.hwpx");

        let source = HttpSource::new("https://example.com".to_string()).unwrap();
        assert_eq!(source.file_name(), "");
    }
}
