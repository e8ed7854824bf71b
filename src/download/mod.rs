//! Streaming payload download.
//!
//! # Features
//!
//! - Streaming downloads (chunks go straight to the sink, never buffered whole)
//! - Configurable timeouts (30s connect, 5min between reads by default)
//! - Structured error types carrying the URL
//! - Bodies cut short of their `Content-Length` fail as transport errors
//!
//! The ingestion path depends only on [`PayloadFetcher`] and [`ChunkSink`];
//! [`HttpClient`] is the production implementation.

mod client;
mod constants;
mod error;
mod fetcher;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use fetcher::{ChunkSink, PayloadFetcher};
