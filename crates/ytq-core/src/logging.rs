//! Logging init: file under XDG state dir, or graceful fallback to stderr.
//!
//! Raw downloader output goes to the listener, never to the log; the log
//! carries orchestration events (job start/finish, spawn failures, stop
//! requests, exit statuses).

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,ytq=debug";

/// Installs the global subscriber on the given sink. Called exactly once per
/// process, by whichever init path the CLI ends up on.
fn init_with_writer(writer: BoxMakeWriter) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

/// Opens (creating as needed) the append-mode log file in the XDG state dir.
fn open_log_file() -> Result<(PathBuf, File)> {
    let state_home = xdg::BaseDirectories::with_prefix("ytq")?.get_state_home();
    fs::create_dir_all(&state_home)
        .with_context(|| format!("create log dir: {}", state_home.display()))?;
    let path = state_home.join("ytq.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;
    Ok((path, file))
}

/// Initialize structured logging to `~/.local/state/ytq/ytq.log`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall
/// back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let (path, file) = open_log_file()?;
    init_with_writer(BoxMakeWriter::new(Arc::new(file)));
    tracing::info!("ytq logging initialized at {}", path.display());
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging()
/// fails so the CLI still gets diagnostics.
pub fn init_logging_stderr() {
    init_with_writer(BoxMakeWriter::new(io::stderr));
}
