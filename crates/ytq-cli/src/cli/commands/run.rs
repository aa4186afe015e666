//! `ytq run` – submit a URL queue and render worker events.

use anyhow::{Context, Result};
use std::path::PathBuf;

use ytq_core::config::{self, RunSettings};
use ytq_core::events::{ProgressEvent, RunResult, WorkerEvent};
use ytq_core::queue;

pub async fn run_queue(
    mut urls: Vec<String>,
    urls_file: Option<PathBuf>,
    cookies: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = config::load_or_init()?;
    if let Some(path) = cookies {
        cfg.cookies_file = Some(path);
    }
    let settings = RunSettings::from_config(&cfg)?;

    if let Some(path) = urls_file {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read urls file: {}", path.display()))?;
        urls.extend(text.lines().map(str::to_string));
    }

    let mut handle = queue::submit(&urls, settings)?;

    // First Ctrl-C requests a cooperative stop; the core's kill grace bounds
    // how long a silent process can delay the shutdown.
    let stop = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStop requested, waiting for the current download to end...");
            stop.request_stop();
        }
    });

    while let Some(event) = handle.events.recv().await {
        match event {
            WorkerEvent::RawLine(line) => println!("{line}"),
            WorkerEvent::Progress(ProgressEvent::File { percent }) => {
                eprintln!("  progress: {percent}%");
            }
            WorkerEvent::Progress(ProgressEvent::Playlist {
                current,
                total,
                percent,
            }) => {
                eprintln!("  playlist: item {current} of {total} ({percent}%)");
            }
            WorkerEvent::Finished(_) => {}
        }
    }

    let report = handle.join().await?;
    match report.result {
        RunResult::CompletedNormally => println!("Download finished."),
        RunResult::StoppedByUser => println!("Download stopped by user."),
    }
    if !report.spawn_failures.is_empty() {
        tracing::warn!(
            failed = report.spawn_failures.len(),
            "some jobs could not launch the downloader"
        );
    }
    Ok(())
}
