//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use print_ingest::download::{ChunkSink, DownloadError, PayloadFetcher};
use print_ingest::ingest::{IngestContext, PrintDataIngestor};
use print_ingest::printer::{
    Command, CommandChannel, CommandError, PrinterState, PrinterStatus, PrinterSubstate,
};
use print_ingest::staging::{SettingsFile, StagingDir};
use tempfile::TempDir;
use tokio::sync::{Notify, watch};

pub fn status(state: PrinterState, substate: PrinterSubstate) -> PrinterStatus {
    PrinterStatus::new(state, substate)
}

pub fn home() -> PrinterStatus {
    status(PrinterState::Home, PrinterSubstate::Normal)
}

pub fn home_download_failed() -> PrinterStatus {
    status(PrinterState::Home, PrinterSubstate::DownloadFailed)
}

/// Shared handle on the status the fakes read and flip.
pub type StatusHandle = Arc<watch::Sender<PrinterStatus>>;

// ---------------------------------------------------------------------------
// Command channel
// ---------------------------------------------------------------------------

/// Records each command along with whether the settings file existed when it was sent.
pub struct RecordingChannel {
    settings_path: PathBuf,
    sent: Mutex<Vec<(Command, bool)>>,
    flip_on: Option<(Command, StatusHandle, PrinterStatus)>,
    fail_on: Option<Command>,
}

impl RecordingChannel {
    pub fn new(settings_path: PathBuf) -> Self {
        Self {
            settings_path,
            sent: Mutex::new(Vec::new()),
            flip_on: None,
            fail_on: None,
        }
    }

    /// Publishes `next` on `status` right after `command` is accepted.
    pub fn flip_status_on(mut self, command: Command, status: StatusHandle, next: PrinterStatus) -> Self {
        self.flip_on = Some((command, status, next));
        self
    }

    /// Fails the send of `command`.
    pub fn fail_on(mut self, command: Command) -> Self {
        self.fail_on = Some(command);
        self
    }

    pub fn commands(&self) -> Vec<Command> {
        self.sent.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    pub fn sent(&self) -> Vec<(Command, bool)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandChannel for RecordingChannel {
    async fn send(&self, command: Command) -> Result<(), CommandError> {
        if self.fail_on == Some(command) {
            return Err(CommandError::Io {
                command,
                path: PathBuf::from("/tmp/CommandPipe"),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
            });
        }

        let settings_present = self.settings_path.exists();
        self.sent.lock().unwrap().push((command, settings_present));

        if let Some((trigger, status, next)) = &self.flip_on
            && *trigger == command
        {
            status.send_replace(*next);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Emits a fixed list of chunks, then succeeds or fails.
pub struct ScriptedFetcher {
    chunks: Vec<Vec<u8>>,
    fail: bool,
    status_after: Option<(StatusHandle, PrinterStatus)>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn succeed<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail: false,
            status_after: None,
            gate: None,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_after<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            fail: true,
            ..Self::succeed(chunks)
        }
    }

    /// Publishes `next` once the chunks are written, before the fetch returns.
    pub fn then_set_status(mut self, status: StatusHandle, next: PrinterStatus) -> Self {
        self.status_after = Some((status, next));
        self
    }

    /// Holds the fetch open until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PayloadFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, sink: &mut dyn ChunkSink) -> Result<u64, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut total = 0u64;
        for chunk in &self.chunks {
            sink.write_chunk(chunk)
                .await
                .map_err(|e| DownloadError::sink(url, e))?;
            total += chunk.len() as u64;
        }

        if let Some((status, next)) = &self.status_after {
            status.send_replace(*next);
        }

        if self.fail {
            return Err(DownloadError::http_status(url, 503));
        }
        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Temp staging layout plus a controllable printer status.
pub struct Harness {
    pub temp: TempDir,
    pub status: StatusHandle,
}

impl Harness {
    pub fn new(initial: PrinterStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            temp: TempDir::new().unwrap(),
            status: Arc::new(tx),
        }
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.temp.path().join("print_data")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.temp.path().join("print_settings")
    }

    pub fn channel(&self) -> RecordingChannel {
        RecordingChannel::new(self.settings_path())
    }

    /// Names of the files currently in the staging directory, sorted.
    pub fn staged_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.staging_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn ingestor(
        &self,
        channel: Arc<RecordingChannel>,
        fetcher: Arc<dyn PayloadFetcher>,
    ) -> PrintDataIngestor {
        PrintDataIngestor::spawn(IngestContext {
            status: Arc::new(self.status.subscribe()),
            commands: channel,
            fetcher,
            staging: StagingDir::new(self.staging_dir()),
            settings: SettingsFile::new(self.settings_path()),
        })
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// Collects formatted log output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Routes this thread's events into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(" ERROR "))
            .collect()
    }
}
