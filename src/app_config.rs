//! Configuration file loading and merging with CLI flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use print_ingest::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use crate::cli::Args;

const DEFAULT_STAGING_DIR: &str = "/var/lib/print-ingest/print_data";
const DEFAULT_SETTINGS_FILE: &str = "/var/lib/print-ingest/print_settings";
const DEFAULT_COMMAND_PIPE: &str = "/tmp/CommandPipe";
const DEFAULT_STATUS_PIPE: &str = "/tmp/PrinterStatusPipe";

/// File configuration; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub staging_dir: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
    pub command_pipe: Option<PathBuf>,
    pub status_pipe: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Filter directive used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Effective settings after applying defaults, config file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub staging_dir: PathBuf,
    pub settings_file: PathBuf,
    pub command_pipe: PathBuf,
    pub status_pipe: PathBuf,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub log_filter: &'static str,
}

impl RuntimeConfig {
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();

        let log_filter = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => file.verbosity.unwrap_or(VerbositySetting::Default).filter(),
                1 => "debug",
                _ => "trace",
            }
        };

        Self {
            staging_dir: pick(&args.staging_dir, file.staging_dir, DEFAULT_STAGING_DIR),
            settings_file: pick(&args.settings_file, file.settings_file, DEFAULT_SETTINGS_FILE),
            command_pipe: pick(&args.command_pipe, file.command_pipe, DEFAULT_COMMAND_PIPE),
            status_pipe: pick(&args.status_pipe, file.status_pipe, DEFAULT_STATUS_PIPE),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
            log_filter,
        }
    }
}

fn pick(cli: &Option<PathBuf>, file: Option<PathBuf>, default: &str) -> PathBuf {
    cli.clone()
        .or(file)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/print-ingest/config.toml`
/// 2. `$HOME/.config/print-ingest/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("print-ingest")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("print-ingest")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config named on the command line, or the default one if present.
///
/// An explicitly named file must exist; the default location is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "staging_dir" | "settings_file" | "command_pipe" | "status_pipe" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                let path = Some(PathBuf::from(parsed));
                match key {
                    "staging_dir" => cfg.staging_dir = path,
                    "settings_file" => cfg.settings_file = path,
                    "command_pipe" => cfg.command_pipe = path,
                    _ => cfg.status_pipe = path,
                }
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                cfg.read_timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_no}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["print-ingest", "http://host/job42.bin", "-s", "settings.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("args should parse")
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
staging_dir = "/data/print_data"
settings_file = "/data/print_settings"
command_pipe = "/run/CommandPipe"   # device input
status_pipe = "/run/StatusPipe"
connect_timeout_secs = 5
read_timeout_secs = 600
verbosity = "verbose"
"#,
        )
        .expect("config should parse");
        assert_eq!(cfg.staging_dir, Some(PathBuf::from("/data/print_data")));
        assert_eq!(cfg.settings_file, Some(PathBuf::from("/data/print_settings")));
        assert_eq!(cfg.command_pipe, Some(PathBuf::from("/run/CommandPipe")));
        assert_eq!(cfg.status_pipe, Some(PathBuf::from("/run/StatusPipe")));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(600));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
    }

    #[test]
    fn test_parse_config_allows_hash_inside_strings() {
        let cfg = parse_config_str(r#"staging_dir = "/data/#1" # trailing"#).expect("should parse");
        assert_eq!(cfg.staging_dir, Some(PathBuf::from("/data/#1")));
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key expected");
        let msg = err.to_string();
        assert!(msg.contains("concurrency"), "got: {msg}");
        assert!(msg.contains("line 1"), "got: {msg}");
    }

    #[test]
    fn test_parse_config_rejects_unquoted_path() {
        let err = parse_config_str("staging_dir = /data").expect_err("quoted string expected");
        assert!(err.to_string().contains("staging_dir"));
    }

    #[test]
    fn test_parse_config_rejects_out_of_range_timeout() {
        let err = parse_config_str("read_timeout_secs = 0").expect_err("range error expected");
        assert!(err.to_string().contains("read_timeout_secs"));

        let err = parse_config_str("connect_timeout_secs = -3").expect_err("negative expected");
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("\nstaging_dir\n").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_resolve_uses_defaults_without_config() {
        let resolved = RuntimeConfig::resolve(&args(&[]), None);
        assert_eq!(resolved.staging_dir, PathBuf::from(DEFAULT_STAGING_DIR));
        assert_eq!(resolved.command_pipe, PathBuf::from(DEFAULT_COMMAND_PIPE));
        assert_eq!(resolved.connect_timeout_secs, CONNECT_TIMEOUT_SECS);
        assert_eq!(resolved.log_filter, "info");
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = FileConfig {
            staging_dir: Some(PathBuf::from("/from/file")),
            status_pipe: Some(PathBuf::from("/from/file/status")),
            verbosity: Some(VerbositySetting::Quiet),
            read_timeout_secs: Some(42),
            ..FileConfig::default()
        };
        let resolved =
            RuntimeConfig::resolve(&args(&["--staging-dir", "/from/cli", "-v"]), Some(&file));
        assert_eq!(resolved.staging_dir, PathBuf::from("/from/cli"));
        assert_eq!(resolved.status_pipe, PathBuf::from("/from/file/status"));
        assert_eq!(resolved.read_timeout_secs, 42);
        assert_eq!(resolved.log_filter, "debug");
    }

    #[test]
    fn test_resolve_file_verbosity_applies_without_flags() {
        let file = FileConfig {
            verbosity: Some(VerbositySetting::Debug),
            ..FileConfig::default()
        };
        assert_eq!(RuntimeConfig::resolve(&args(&[]), Some(&file)).log_filter, "trace");
        assert_eq!(
            RuntimeConfig::resolve(&args(&["-q"]), Some(&file)).log_filter,
            "error"
        );
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let err = load_file_config(Some(Path::new("/nonexistent/print-ingest.toml")))
            .expect_err("missing explicit config must fail");
        assert!(err.to_string().contains("/nonexistent/print-ingest.toml"));
    }
}
