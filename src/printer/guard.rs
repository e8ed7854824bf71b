//! Precondition checks against the printer's current status.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use super::status::{PrinterState, PrinterStatus, PrinterSubstate};

/// Source of the printer's current `(state, substate)`.
///
/// Reads are synchronous and have no side effects.
pub trait StatusSource: Send + Sync {
    /// Returns the most recent status.
    fn read(&self) -> PrinterStatus;
}

impl StatusSource for watch::Receiver<PrinterStatus> {
    fn read(&self) -> PrinterStatus {
        *self.borrow()
    }
}

impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    fn read(&self) -> PrinterStatus {
        (**self).read()
    }
}

/// The printer was not in a state that allows the next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("printer in state {status}, expected {expected}")]
pub struct InvalidState {
    /// Description of the condition that was required.
    pub expected: &'static str,
    /// What the printer actually reported.
    pub status: PrinterStatus,
}

/// Label for [`is_home`].
pub const HOME: &str = "Home state";

/// Label for [`ready_for_print_data`].
pub const READY_FOR_PRINT_DATA: &str = "Home state without a failed download";

/// Printer is in its home state.
#[must_use]
pub fn is_home(state: PrinterState, _substate: PrinterSubstate) -> bool {
    state == PrinterState::Home
}

/// Printer is home and has not flagged the download as failed.
#[must_use]
pub fn ready_for_print_data(state: PrinterState, substate: PrinterSubstate) -> bool {
    state == PrinterState::Home && substate != PrinterSubstate::DownloadFailed
}

/// Evaluates predicates over the printer's status at the moment of the call.
#[derive(Clone, Copy)]
pub struct StateGuard<'a> {
    source: &'a dyn StatusSource,
}

impl<'a> StateGuard<'a> {
    #[must_use]
    pub fn new(source: &'a dyn StatusSource) -> Self {
        Self { source }
    }

    /// Reads the current status once and checks it against `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidState`] carrying the status that was read when the
    /// predicate does not hold.
    pub fn validate<P>(&self, expected: &'static str, predicate: P) -> Result<PrinterStatus, InvalidState>
    where
        P: FnOnce(PrinterState, PrinterSubstate) -> bool,
    {
        let status = self.source.read();
        if predicate(status.state, status.substate) {
            debug!(%status, expected, "printer state check passed");
            Ok(status)
        } else {
            Err(InvalidState { expected, status })
        }
    }
}
