//! Entry point for print data jobs.
//!
//! [`PrintDataIngestor::handle`] checks readiness on the caller's stack and
//! hands everything else to a single worker task, so the caller never waits
//! on network or disk I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::attempt::{AttemptReport, IngestAttempt, IngestContext};
use super::request::JobRequest;
use crate::printer::StatusSource;

/// Result of [`PrintDataIngestor::handle`].
///
/// Informational only: failures have already been logged by the time this
/// is returned.
#[derive(Debug)]
pub enum HandleOutcome {
    /// The printer was ready; the download has been scheduled.
    Accepted(AttemptHandle),
    /// The printer was not ready; nothing was downloaded.
    Rejected(AttemptReport),
    /// Another attempt is still in flight.
    Busy,
    /// The worker is gone; nothing was scheduled.
    Unavailable,
}

/// Resolves to the report of an accepted attempt.
#[derive(Debug)]
pub struct AttemptHandle {
    report: oneshot::Receiver<AttemptReport>,
}

impl AttemptHandle {
    /// Waits for the attempt to reach a terminal state.
    ///
    /// Returns `None` only if the worker stopped before finishing.
    pub async fn wait(self) -> Option<AttemptReport> {
        self.report.await.ok()
    }
}

struct Submission {
    attempt: IngestAttempt,
    reply: oneshot::Sender<AttemptReport>,
}

/// Downloads print data and drives the printer through loading it.
///
/// One attempt at a time: a job handed in while another is in flight is
/// rejected with [`HandleOutcome::Busy`].
pub struct PrintDataIngestor {
    status: Arc<dyn StatusSource>,
    submissions: mpsc::UnboundedSender<Submission>,
    in_flight: Arc<AtomicBool>,
}

impl PrintDataIngestor {
    /// Starts the worker task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(context: IngestContext) -> Self {
        let (submissions, queue) = mpsc::unbounded_channel();
        let in_flight = Arc::new(AtomicBool::new(false));
        let status = Arc::clone(&context.status);

        tokio::spawn(run_worker(context, queue, Arc::clone(&in_flight)));

        Self {
            status,
            submissions,
            in_flight,
        }
    }

    /// Whether an attempt is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Starts an attempt for `job`.
    ///
    /// Checks that the printer is home, then schedules the download on the
    /// worker and returns without waiting for it.
    pub fn handle(&self, job: JobRequest) -> HandleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(url = %job.file_url, "print data attempt already in progress, rejecting job");
            return HandleOutcome::Busy;
        }

        let mut attempt = IngestAttempt::new(job);
        if let Err(e) = attempt.begin(self.status.as_ref()) {
            self.in_flight.store(false, Ordering::SeqCst);
            return HandleOutcome::Rejected(attempt.finish(Some(e)));
        }

        let (reply, report) = oneshot::channel();
        if let Err(mpsc::error::SendError(submission)) =
            self.submissions.send(Submission { attempt, reply })
        {
            self.in_flight.store(false, Ordering::SeqCst);
            error!(
                url = %submission.attempt.file_url(),
                "ingest worker is not running, dropping print data job"
            );
            return HandleOutcome::Unavailable;
        }

        info!("print data download scheduled");
        HandleOutcome::Accepted(AttemptHandle { report })
    }
}

async fn run_worker(
    context: IngestContext,
    mut queue: mpsc::UnboundedReceiver<Submission>,
    in_flight: Arc<AtomicBool>,
) {
    while let Some(Submission { attempt, reply }) = queue.recv().await {
        let report = attempt.run(&context).await;
        in_flight.store(false, Ordering::SeqCst);
        if reply.send(report).is_err() {
            debug!("attempt report dropped, no one waiting");
        }
    }
    debug!("ingest worker stopped");
}
