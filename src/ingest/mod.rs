//! Download-and-dispatch orchestration for print data jobs.
//!
//! # Overview
//!
//! An attempt checks that the printer is home, purges the staging
//! directory, streams the payload into a file named after the URL's last
//! path segment, then re-checks printer state and issues
//! `showprintdataloading`, writes the settings file, and issues
//! `processprintdata` and `applyprintsettings`. The state is re-checked
//! after the first command as well.
//!
//! Every failure ends the attempt locally: it is logged once and recorded
//! on the [`AttemptReport`]; nothing propagates to the caller of
//! [`PrintDataIngestor::handle`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use print_ingest::download::HttpClient;
//! use print_ingest::ingest::{HandleOutcome, IngestContext, JobRequest, PrintDataIngestor};
//! use print_ingest::printer::{PipeCommandChannel, PrinterState, PrinterStatus, PrinterSubstate};
//! use print_ingest::staging::{SettingsFile, StagingDir};
//! use tokio::sync::watch;
//!
//! # async fn example() {
//! let (_status_tx, status_rx) = watch::channel(PrinterStatus::new(
//!     PrinterState::Home,
//!     PrinterSubstate::Normal,
//! ));
//! let ingestor = PrintDataIngestor::spawn(IngestContext {
//!     status: Arc::new(status_rx),
//!     commands: Arc::new(PipeCommandChannel::new("/tmp/CommandPipe")),
//!     fetcher: Arc::new(HttpClient::new()),
//!     staging: StagingDir::new("/var/lib/print-ingest/print_data"),
//!     settings: SettingsFile::new("/var/lib/print-ingest/print_settings"),
//! });
//!
//! let job = JobRequest::new("http://host/job42.bin", r#"{"JobName": "bracket"}"#);
//! if let HandleOutcome::Accepted(handle) = ingestor.handle(job) {
//!     let report = handle.wait().await;
//!     println!("{report:?}");
//! }
//! # }
//! ```

mod attempt;
mod error;
mod request;
mod service;
mod state;

pub use attempt::{AttemptReport, IngestContext};
pub use error::IngestError;
pub use request::JobRequest;
pub use service::{AttemptHandle, HandleOutcome, PrintDataIngestor};
pub use state::{IngestEvent, IngestState, TransitionError};
