//! Follows the device status pipe and publishes the latest status.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::status::{PrinterStatus, StatusError};

/// Reads newline-delimited status objects from the device.
pub struct StatusMonitor<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> StatusMonitor<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Returns the next status, skipping blank lines, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Parse`] for a malformed line and
    /// [`StatusError::Io`] when the pipe cannot be read.
    pub async fn next_status(&mut self) -> Result<Option<PrinterStatus>, StatusError> {
        while let Some(line) = self.lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            return PrinterStatus::from_json_line(&line).map(Some);
        }
        Ok(None)
    }

    /// Publishes every status read until end of input.
    ///
    /// Malformed lines are logged and skipped. Stops early if every receiver
    /// has been dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Io`] when the pipe cannot be read.
    pub async fn run(mut self, sender: watch::Sender<PrinterStatus>) -> Result<(), StatusError> {
        loop {
            match self.next_status().await {
                Ok(Some(status)) => {
                    debug!(%status, "printer status update");
                    if sender.send(status).is_err() {
                        debug!("no status receivers left, stopping monitor");
                        return Ok(());
                    }
                }
                Ok(None) => {
                    info!("printer status pipe closed");
                    return Ok(());
                }
                Err(StatusError::Parse { line, source }) => {
                    warn!(line = %line, error = %source, "skipping unreadable printer status");
                }
                Err(err @ StatusError::Io(_)) => return Err(err),
            }
        }
    }
}
