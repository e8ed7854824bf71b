//! CLI entry point: runs one print data attempt against a local printer.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use print_ingest::download::HttpClient;
use print_ingest::ingest::{HandleOutcome, IngestContext, JobRequest, PrintDataIngestor};
use print_ingest::printer::{PipeCommandChannel, StatusMonitor};
use print_ingest::staging::{SettingsFile, StagingDir};
use tokio::sync::watch;
use tracing::{debug, info, warn};

mod app_config;
mod cli;

use app_config::RuntimeConfig;
use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let config = RuntimeConfig::resolve(&args, file_config.as_ref());

    // Priority: RUST_LOG env var > CLI flags > config file > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, ?config, "configuration resolved");

    let job = read_job(&args).await?;
    info!(url = %job.file_url, "print data job received");

    let fetcher = HttpClient::with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)?;

    let status_pipe = tokio::fs::File::open(&config.status_pipe)
        .await
        .with_context(|| format!("Failed to open status pipe '{}'", config.status_pipe.display()))?;
    let mut monitor = StatusMonitor::new(status_pipe);
    let Some(initial) = monitor
        .next_status()
        .await
        .context("Failed to read initial printer status")?
    else {
        bail!("Status pipe '{}' closed before reporting a status", config.status_pipe.display());
    };
    debug!(status = %initial, "initial printer status");

    let (status_tx, status_rx) = watch::channel(initial);
    tokio::spawn(async move {
        if let Err(e) = monitor.run(status_tx).await {
            warn!(error = %e, "printer status monitor stopped");
        }
    });

    let ingestor = PrintDataIngestor::spawn(IngestContext {
        status: Arc::new(status_rx),
        commands: Arc::new(PipeCommandChannel::new(&config.command_pipe)),
        fetcher: Arc::new(fetcher),
        staging: StagingDir::new(&config.staging_dir),
        settings: SettingsFile::new(&config.settings_file),
    });

    let report = match ingestor.handle(job) {
        HandleOutcome::Accepted(handle) => handle.wait().await,
        HandleOutcome::Rejected(report) => Some(report),
        HandleOutcome::Busy | HandleOutcome::Unavailable => None,
    };

    let Some(report) = report else {
        return Ok(ExitCode::FAILURE);
    };

    info!(
        state = %report.state,
        bytes = report.bytes_received,
        commands = report.commands_sent.len(),
        "print data attempt finished"
    );

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_job(args: &Args) -> Result<JobRequest> {
    if let Some(payload_path) = &args.payload {
        let raw = tokio::fs::read_to_string(payload_path)
            .await
            .with_context(|| format!("Failed to read payload '{}'", payload_path.display()))?;
        return JobRequest::from_payload_json(&raw)
            .with_context(|| format!("Failed to parse payload '{}'", payload_path.display()));
    }

    let (Some(url), Some(settings_path)) = (&args.url, &args.settings) else {
        bail!("Either a URL with --settings or --payload is required");
    };
    let settings = tokio::fs::read(settings_path)
        .await
        .with_context(|| format!("Failed to read settings '{}'", settings_path.display()))?;
    Ok(JobRequest::new(url.clone(), settings))
}
