//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download print data and hand it to the printer.
///
/// Checks that the printer is home, streams the payload into the staging
/// directory, writes the print settings file and issues the commands that
/// make the printer load and process the payload.
#[derive(Parser, Debug)]
#[command(name = "print-ingest")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the print data payload
    #[arg(required_unless_present = "payload", conflicts_with = "payload")]
    pub url: Option<String>,

    /// File holding the print settings blob for the payload
    #[arg(short, long, requires = "url", required_unless_present = "payload")]
    pub settings: Option<PathBuf>,

    /// JSON print_data command payload (`{"file_url": ..., "settings": ...}`)
    #[arg(short, long)]
    pub payload: Option<PathBuf>,

    /// Config file (defaults to $XDG_CONFIG_HOME/print-ingest/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the printer reads print data from
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// File the printer reads print settings from
    #[arg(long)]
    pub settings_file: Option<PathBuf>,

    /// Printer command pipe
    #[arg(long)]
    pub command_pipe: Option<PathBuf>,

    /// Printer status pipe
    #[arg(long)]
    pub status_pipe: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
