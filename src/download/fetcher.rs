//! Contract between the ingestion path and whatever fetches the payload.

use async_trait::async_trait;

use super::DownloadError;

/// Destination for streamed payload bytes.
#[async_trait]
pub trait ChunkSink: Send {
    /// Stores one chunk. Chunks arrive in stream order.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error; the fetch is then aborted.
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()>;
}

#[async_trait]
impl ChunkSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Streaming fetch of a payload identified by URL.
///
/// Every chunk is handed to the sink before the call returns, and the
/// returned `Result` is the single terminal outcome of the fetch. There is
/// no internal retry.
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    /// Fetches `url` into `sink`, returning the number of bytes delivered.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for transport errors, non-2xx responses,
    /// premature end of stream and sink failures.
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, DownloadError>;
}
