//! Why a payload fetch failed.
//!
//! Every variant carries the URL being fetched so a single log line is
//! enough to identify the failed payload.

use thiserror::Error;

/// Errors that end a payload fetch.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection, DNS or TLS failure, or the body stream broke off.
    #[error("transport error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connect or read deadline passed.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// Non-2xx response.
    #[error("server answered HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// The sink rejected a chunk.
    #[error("IO error storing data from {url}: {source}")]
    Sink {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Not an absolute URL.
    #[error("cannot fetch malformed URL {url}")]
    InvalidUrl { url: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn sink(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            url: url.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the URL.
