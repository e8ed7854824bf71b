//! Explicit state machine for one ingestion attempt.
//!
//! ```text
//! Idle -> Validating -> Downloading -> Completed -> Dispatching -> Done
//!             |              |             |            |
//!             v              v             v            v
//!          Aborted     DownloadFailed   Aborted      Aborted
//! ```

use std::fmt;

use thiserror::Error;

/// Where an attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestState {
    Idle,
    Validating,
    Downloading,
    Completed,
    DownloadFailed,
    Dispatching,
    Done,
    Aborted,
}

impl IngestState {
    /// `Done`, `Aborted` and `DownloadFailed` end the attempt.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::DownloadFailed)
    }

    /// Applies `event`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if `event` is not accepted in this state.
    pub fn on(self, event: IngestEvent) -> Result<Self, TransitionError> {
        use IngestEvent as E;

        let next = match (self, event) {
            (Self::Idle, E::Handle) => Self::Validating,
            (Self::Validating, E::ReadinessConfirmed) => Self::Downloading,
            (Self::Downloading, E::FetchSucceeded) => Self::Completed,
            (Self::Downloading, E::FetchFailed) => Self::DownloadFailed,
            (Self::Completed, E::DispatchCleared) => Self::Dispatching,
            (Self::Dispatching, E::SequenceCompleted) => Self::Done,
            (Self::Validating | Self::Completed | Self::Dispatching, E::GuardFailed)
            | (Self::Dispatching, E::DispatchFailed) => Self::Aborted,
            (from, event) => return Err(TransitionError { from, event }),
        };
        Ok(next)
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::DownloadFailed => "download_failed",
            Self::Dispatching => "dispatching",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        write!(f, "{label}")
    }
}

/// Something that happened to an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestEvent {
    /// `handle()` was called.
    Handle,
    /// The printer was home when the attempt started.
    ReadinessConfirmed,
    /// A state check failed.
    GuardFailed,
    /// The payload was fully received and staged.
    FetchSucceeded,
    /// The payload could not be fetched or staged.
    FetchFailed,
    /// The post-download state check passed.
    DispatchCleared,
    /// A command or the settings write failed.
    DispatchFailed,
    /// All commands were sent.
    SequenceCompleted,
}

/// An event arrived in a state that does not accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event {event:?} not accepted in state {from}")]
pub struct TransitionError {
    pub from: IngestState,
    pub event: IngestEvent,
}
