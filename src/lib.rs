//! Print data ingestion for a printer control client.
//!
//! Downloads a print data payload, stages it where the printer expects it,
//! and issues the command sequence that has the printer load and process it,
//! re-checking printer state before each step.
//!
//! # Architecture
//!
//! - [`printer`] - Printer status, state checks, command channel
//! - [`download`] - Streaming HTTP fetch of the payload
//! - [`staging`] - Staging directory, staged payload file, settings file
//! - [`ingest`] - The download-then-dispatch state machine

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod ingest;
pub mod printer;
pub mod staging;

mod user_agent;

// Re-export commonly used types
pub use download::{DownloadError, HttpClient, PayloadFetcher};
pub use ingest::{
    AttemptReport, HandleOutcome, IngestContext, IngestError, IngestState, JobRequest,
    PrintDataIngestor,
};
pub use printer::{Command, PrinterState, PrinterStatus, PrinterSubstate, StateGuard};
pub use staging::{SettingsFile, StagingDir};
