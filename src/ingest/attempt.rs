//! One download-then-dispatch attempt.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::error::IngestError;
use super::request::JobRequest;
use super::state::{IngestEvent, IngestState, TransitionError};
use crate::download::PayloadFetcher;
use crate::printer::guard::{
    HOME, READY_FOR_PRINT_DATA, StateGuard, StatusSource, is_home, ready_for_print_data,
};
use crate::printer::{Command, CommandChannel};
use crate::staging::{SettingsFile, StagingDir, StagingFile, staging_file_name};

/// Collaborators an attempt works against.
pub struct IngestContext {
    pub status: Arc<dyn StatusSource>,
    pub commands: Arc<dyn CommandChannel>,
    pub fetcher: Arc<dyn PayloadFetcher>,
    pub staging: StagingDir,
    pub settings: SettingsFile,
}

/// How an attempt ended.
#[derive(Debug)]
pub struct AttemptReport {
    pub file_url: String,
    /// Final state; always terminal.
    pub state: IngestState,
    /// Every state visited, starting with `Idle`.
    pub history: Vec<IngestState>,
    /// Why the attempt did not reach `Done`.
    pub failure: Option<IngestError>,
    /// Staged payload, once the staging file was closed.
    pub staged_path: Option<PathBuf>,
    pub bytes_received: u64,
    /// Commands issued, in order.
    pub commands_sent: Vec<Command>,
}

impl AttemptReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == IngestState::Done
    }
}

pub(crate) struct IngestAttempt {
    job: JobRequest,
    state: IngestState,
    history: Vec<IngestState>,
    staged_path: Option<PathBuf>,
    bytes_received: u64,
    commands_sent: Vec<Command>,
}

impl IngestAttempt {
    pub(crate) fn new(job: JobRequest) -> Self {
        Self {
            job,
            state: IngestState::Idle,
            history: vec![IngestState::Idle],
            staged_path: None,
            bytes_received: 0,
            commands_sent: Vec::new(),
        }
    }

    pub(crate) fn file_url(&self) -> &str {
        &self.job.file_url
    }

    fn advance(&mut self, event: IngestEvent) -> Result<(), TransitionError> {
        let next = self.state.on(event)?;
        debug!(from = %self.state, to = %next, ?event, "ingest transition");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Moves to the failure state for `event` and returns the error that caused it.
    fn fail(&mut self, event: IngestEvent, cause: impl Into<IngestError>) -> IngestError {
        let cause = cause.into();
        match self.advance(event) {
            Ok(()) => cause,
            Err(transition) => {
                debug!(error = %cause, ?event, "failure superseded by invalid transition");
                transition.into()
            }
        }
    }

    /// Runs the readiness check; on success the attempt is `Downloading`.
    ///
    /// Synchronous: nothing here touches the network or the file system.
    pub(crate) fn begin(&mut self, status: &dyn StatusSource) -> Result<(), IngestError> {
        self.advance(IngestEvent::Handle)?;
        match StateGuard::new(status).validate(HOME, is_home) {
            Ok(_) => Ok(self.advance(IngestEvent::ReadinessConfirmed)?),
            Err(invalid) => Err(self.fail(IngestEvent::GuardFailed, invalid)),
        }
    }

    /// Downloads and dispatches, then reports. Expects [`begin`](Self::begin) to have passed.
    pub(crate) async fn run(mut self, ctx: &IngestContext) -> AttemptReport {
        let outcome = self.execute(ctx).await;
        self.finish(outcome.err())
    }

    #[instrument(skip_all, fields(url = %self.job.file_url))]
    async fn execute(&mut self, ctx: &IngestContext) -> Result<(), IngestError> {
        self.download(ctx).await?;
        self.dispatch(ctx).await
    }

    async fn download(&mut self, ctx: &IngestContext) -> Result<(), IngestError> {
        let url = self.job.file_url.clone();

        let mut file = match open_staging_file(&ctx.staging, &url).await {
            Ok(file) => file,
            Err(e) => return Err(self.fail(IngestEvent::FetchFailed, e)),
        };

        let fetched = ctx.fetcher.fetch(&url, &mut file).await;
        self.bytes_received = file.bytes_written();
        let closed = file.close().await;

        match (fetched, closed) {
            (Ok(_), Ok(path)) => {
                info!(
                    url = %url,
                    path = %path.display(),
                    bytes = self.bytes_received,
                    "print data download complete"
                );
                self.staged_path = Some(path);
                Ok(self.advance(IngestEvent::FetchSucceeded)?)
            }
            (Ok(_), Err(e)) => Err(self.fail(IngestEvent::FetchFailed, e)),
            (Err(source), closed) => {
                match closed {
                    Ok(path) => self.staged_path = Some(path),
                    Err(e) => warn!(error = %e, "failed to close staging file after download error"),
                }
                Err(self.fail(
                    IngestEvent::FetchFailed,
                    IngestError::download_failure(url, source),
                ))
            }
        }
    }

    async fn dispatch(&mut self, ctx: &IngestContext) -> Result<(), IngestError> {
        let guard = StateGuard::new(ctx.status.as_ref());

        if let Err(invalid) = guard.validate(READY_FOR_PRINT_DATA, ready_for_print_data) {
            return Err(self.fail(IngestEvent::GuardFailed, invalid));
        }
        self.advance(IngestEvent::DispatchCleared)?;

        self.send(ctx, Command::PrintDataLoad).await?;

        // State may have changed while the load command was being issued.
        if let Err(invalid) = guard.validate(READY_FOR_PRINT_DATA, ready_for_print_data) {
            return Err(self.fail(IngestEvent::GuardFailed, invalid));
        }

        if let Err(e) = ctx.settings.write(&self.job.settings).await {
            return Err(self.fail(IngestEvent::DispatchFailed, e));
        }

        self.send(ctx, Command::ProcessPrintData).await?;
        self.send(ctx, Command::ApplyPrintSettings).await?;

        Ok(self.advance(IngestEvent::SequenceCompleted)?)
    }

    async fn send(&mut self, ctx: &IngestContext, command: Command) -> Result<(), IngestError> {
        if let Err(e) = ctx.commands.send(command).await {
            return Err(self.fail(IngestEvent::DispatchFailed, e));
        }
        self.commands_sent.push(command);
        Ok(())
    }

    /// Logs the outcome (one error line for any failure) and builds the report.
    pub(crate) fn finish(self, failure: Option<IngestError>) -> AttemptReport {
        match &failure {
            Some(IngestError::DownloadFailure { url, source }) => {
                error!(url = %url, error = %source, "error downloading print data, aborting print_data handling");
            }
            Some(e) if !self.history.contains(&IngestState::Downloading) => {
                error!(
                    url = %self.job.file_url,
                    error = %e,
                    "not downloading print data, aborting print_data handling"
                );
            }
            Some(e) => {
                error!(
                    url = %self.job.file_url,
                    state = %self.state,
                    error = %e,
                    "aborting print_data handling"
                );
            }
            None => {
                info!(url = %self.job.file_url, commands = self.commands_sent.len(), "print data handed to printer");
            }
        }

        AttemptReport {
            file_url: self.job.file_url,
            state: self.state,
            history: self.history,
            failure,
            staged_path: self.staged_path,
            bytes_received: self.bytes_received,
            commands_sent: self.commands_sent,
        }
    }
}

/// Purges the staging directory, then opens a file named after the URL.
async fn open_staging_file(staging: &StagingDir, url: &str) -> Result<StagingFile, IngestError> {
    staging.purge().await?;
    let name = staging_file_name(url)?;
    Ok(staging.open(&name).await?)
}
