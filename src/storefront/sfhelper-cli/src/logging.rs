//! Log subscriber setup.
//!
//! The TUI owns the terminal, so interactive sessions only log when a log
//! file is given. Plain mode logs to stderr with `--verbose`.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log output goes, if anywhere.
#[derive(Debug, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Off,
    Stderr,
    File(&'a Path),
}

impl<'a> LogTarget<'a> {
    pub fn choose(log_file: Option<&'a Path>, verbose: bool, interactive: bool) -> Self {
        match (log_file, verbose, interactive) {
            (Some(path), _, _) => LogTarget::File(path),
            (None, true, false) => LogTarget::Stderr,
            _ => LogTarget::Off,
        }
    }
}

fn filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,sfhelper_cli={level},sfhelper_catalog={level}"
        ))
    })
}

/// Install the global subscriber for `target`.
pub fn init(target: LogTarget<'_>, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(verbose));
    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
