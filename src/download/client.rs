//! HTTP client wrapper for streaming print data downloads.
//!
//! This module provides the `HttpClient` struct which streams a response body
//! into a [`ChunkSink`] with timeout configuration and error handling.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::fetcher::{ChunkSink, PayloadFetcher};
use crate::user_agent;

/// HTTP client for downloading print data with streaming support.
///
/// Create once and reuse; the underlying connection pool is shared by clones.
///
/// # Example
///
/// ```no_run
/// use print_ingest::download::{HttpClient, PayloadFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let mut body = Vec::new();
/// let bytes = client.fetch("http://printer-host/jobs/job42.bin", &mut body).await?;
/// println!("received {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes without data
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] if reqwest rejects the
    /// configuration (for example when the TLS backend cannot initialize).
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_download_user_agent())
            .build()
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self { client })
    }

    async fn send_request(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PayloadFetcher for HttpClient {
    #[instrument(skip(self, sink), fields(url = %url))]
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.send_request(url).await?;
        // A body cut short of its Content-Length fails inside the stream.
        let received = stream_to_sink(response, url, sink).await?;

        info!(bytes = received, "download complete");
        Ok(received)
    }
}

/// Streams the response body into `sink`, returning bytes delivered.
async fn stream_to_sink(
    response: reqwest::Response,
    url: &str,
    sink: &mut dyn ChunkSink,
) -> Result<u64, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut received: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        sink.write_chunk(&chunk)
            .await
            .map_err(|e| DownloadError::sink(url, e))?;

        received += chunk.len() as u64;
    }

    Ok(received)
}
