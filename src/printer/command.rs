//! Commands sent to the printer and the pipe that carries them.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Device commands issued while handing over print data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Show the loading screen for incoming print data.
    PrintDataLoad,
    /// Process the single file in the print data directory.
    ProcessPrintData,
    /// Load settings from the print settings file.
    ApplyPrintSettings,
}

impl Command {
    /// Token understood by the device's command interpreter.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::PrintDataLoad => "showprintdataloading",
            Self::ProcessPrintData => "processprintdata",
            Self::ApplyPrintSettings => "applyprintsettings",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Errors delivering a command to the device.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("IO error sending command '{command}' to {path}: {source}")]
    Io {
        command: Command,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fire-and-forget command delivery; no acknowledgement is awaited.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Sends one command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command could not be handed to the
    /// transport.
    async fn send(&self, command: Command) -> Result<(), CommandError>;
}

/// Writes newline-terminated command tokens to the device command pipe.
#[derive(Debug, Clone)]
pub struct PipeCommandChannel {
    path: PathBuf,
}

impl PipeCommandChannel {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CommandChannel for PipeCommandChannel {
    #[instrument(skip(self), fields(pipe = %self.path.display()))]
    async fn send(&self, command: Command) -> Result<(), CommandError> {
        let io_err = |source| CommandError::Io {
            command,
            path: self.path.clone(),
            source,
        };

        let mut pipe = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        pipe.write_all(format!("{}\n", command.token()).as_bytes())
            .await
            .map_err(io_err)?;
        pipe.flush().await.map_err(io_err)?;

        debug!(command = %command, "command sent");
        Ok(())
    }
}
