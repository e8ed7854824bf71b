//! Printer-facing collaborators: status, state checks, commands.
//!
//! - [`status`] - `(state, substate)` model and status-line parsing
//! - [`guard`] - [`StateGuard`] precondition checks over a [`StatusSource`]
//! - [`command`] - [`Command`] tokens and the [`CommandChannel`] that carries them
//! - [`monitor`] - [`StatusMonitor`] following the device status pipe

pub mod command;
pub mod guard;
pub mod monitor;
pub mod status;

pub use command::{Command, CommandChannel, CommandError, PipeCommandChannel};
pub use guard::{InvalidState, StateGuard, StatusSource, is_home, ready_for_print_data};
pub use monitor::StatusMonitor;
pub use status::{PrinterState, PrinterStatus, PrinterSubstate, StatusError};
