//! Error taxonomy for the ingestion path.
//!
//! None of these escape an attempt: they end it, get logged once, and are
//! kept on the [`AttemptReport`](super::AttemptReport) for inspection.

use thiserror::Error;

use super::state::TransitionError;
use crate::download::DownloadError;
use crate::printer::{CommandError, InvalidState};
use crate::staging::StagingError;

#[derive(Debug, Error)]
pub enum IngestError {
    /// A state check failed.
    #[error(transparent)]
    InvalidState(#[from] InvalidState),

    /// The payload could not be fetched.
    #[error("error downloading print data from {url}: {source}")]
    DownloadFailure {
        url: String,
        #[source]
        source: DownloadError,
    },

    /// Staging directory, staging file or settings file failure.
    #[error(transparent)]
    Staging(#[from] StagingError),

    /// A command could not be delivered.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Malformed job payload.
    #[error("invalid print data payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// Internal sequencing bug.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl IngestError {
    pub fn download_failure(url: impl Into<String>, source: DownloadError) -> Self {
        Self::DownloadFailure {
            url: url.into(),
            source,
        }
    }
}
