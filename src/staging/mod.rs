//! Local storage touched by an ingestion attempt.
//!
//! - [`StagingDir`] holds at most one payload file; it is purged before each attempt
//! - [`StagingFile`] is the write-only handle the payload streams into
//! - [`SettingsFile`] is the fixed location the device reads print settings from

mod filename;
mod settings;

pub use filename::staging_file_name;
pub use settings::SettingsFile;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::download::ChunkSink;

/// Errors from staging directory and settings file operations.
#[derive(Debug, Error)]
pub enum StagingError {
    /// The payload URL does not yield a usable file name.
    #[error("cannot derive a staging file name from {url}")]
    InvalidFileName { url: String },

    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StagingError {
    pub fn invalid_file_name(url: impl Into<String>) -> Self {
        Self::InvalidFileName { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Directory the device expects to contain exactly the payload being processed.
#[derive(Debug, Clone)]
pub struct StagingDir {
    root: PathBuf,
}

impl StagingDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Removes every entry in the directory, creating it if missing.
    ///
    /// Safe to call repeatedly; returns the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Io`] if the directory cannot be created or
    /// listed, or an entry cannot be removed.
    pub async fn purge(&self) -> Result<usize, StagingError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StagingError::io(&self.root, e))?;

        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StagingError::io(&self.root, e))?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StagingError::io(&self.root, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StagingError::io(&path, e))?;
            let result = if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.map_err(|e| StagingError::io(&path, e))?;
            removed += 1;
        }

        debug!(dir = %self.root.display(), removed, "staging directory purged");
        Ok(removed)
    }

    /// Creates (or truncates) `<dir>/<file_name>` for writing.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Io`] if the file cannot be created.
    pub async fn open(&self, file_name: &str) -> Result<StagingFile, StagingError> {
        let path = self.root.join(file_name);
        let file = File::create(&path)
            .await
            .map_err(|e| StagingError::io(&path, e))?;
        Ok(StagingFile {
            path,
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }
}

/// Write-only handle to the staged payload.
///
/// [`close`](Self::close) consumes the handle, so it runs at most once and no
/// write can follow it.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl StagingFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes buffered data and closes the file, returning its path.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::Io`] if buffered data cannot be written out.
    pub async fn close(mut self) -> Result<PathBuf, StagingError> {
        self.writer
            .flush()
            .await
            .map_err(|e| StagingError::io(&self.path, e))?;
        self.writer
            .shutdown()
            .await
            .map_err(|e| StagingError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = self.bytes_written, "staging file closed");
        Ok(self.path)
    }
}

#[async_trait]
impl ChunkSink for StagingFile {
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }
}
