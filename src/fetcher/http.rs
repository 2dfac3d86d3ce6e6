//! reqwest-backed image downloader
//!
//! Streams the body with a size cap. Rate limiting belongs to the caller,
//! which fetches one asset at a time.

use futures::StreamExt;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::types::FetchError;
use super::AssetFetcher;
use crate::utils::constants::CHROME_USER_AGENT;

#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpAssetFetcher {
    #[must_use]
    pub fn new(timeout: Duration, max_bytes: usize) -> Self {
        Self::with_client(Client::new(), timeout, max_bytes)
    }

    #[must_use]
    pub fn with_client(client: Client, timeout: Duration, max_bytes: usize) -> Self {
        Self {
            client,
            timeout,
            max_bytes,
        }
    }
}

impl AssetFetcher for HttpAssetFetcher {
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", CHROME_USER_AGENT)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        operation: "Asset download".to_string(),
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    FetchError::Navigation(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        // Reject before reading when the server announces the size
        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.max_bytes as u64 {
            return Err(FetchError::Body(format!(
                "asset too large: {expected_size} bytes exceeds limit of {} bytes",
                self.max_bytes
            )));
        }

        let mut buffer = Vec::with_capacity(usize::try_from(expected_size).unwrap_or(0));
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| FetchError::Body(e.to_string()))?;

            let new_total = buffer.len() + chunk.len();
            if new_total > self.max_bytes {
                return Err(FetchError::Body(format!(
                    "asset exceeded size limit during download: {new_total} bytes (max: {})",
                    self.max_bytes
                )));
            }
            buffer.extend_from_slice(&chunk);
        }

        debug!(target: "sitemirror::assets", "Downloaded {} bytes from {url}", buffer.len());
        Ok(buffer)
    }
}
