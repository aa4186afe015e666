//! Job queue orchestrator: one dedicated worker task drives queued URLs
//! through the downloader, strictly one process at a time.
//!
//! Per output line the worker feeds the parser (which may emit a progress
//! event), forwards the raw line, then checks the cancellation token. On a
//! stop request the active process is terminated and the remaining queue is
//! skipped. Spawn failures become a synthetic "Error: ..." line plus a
//! structured record in the run report; the queue keeps going.

use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::RunSettings;
use crate::control::CancelToken;
use crate::events::{RunResult, WorkerEvent};
use crate::jobs::{self, Job};
use crate::parser::ProgressState;
use crate::runner::ProcessSource;

/// Submission failures. Neither aborts a run already in progress.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Every submitted entry was blank or whitespace-only.
    #[error("no non-blank URLs were submitted")]
    EmptyQueue,
}

/// A downloader process that could not be launched. Reported to the listener
/// as a raw "Error: ..." line and recorded here so callers can assert on it
/// without string matching.
#[derive(Debug, Clone)]
pub struct SpawnFailure {
    pub url: String,
    pub message: String,
}

/// Summary of one finished run.
#[derive(Debug)]
pub struct RunReport {
    pub result: RunResult,
    /// Jobs whose process was actually started (spawn failures excluded).
    pub jobs_run: usize,
    pub spawn_failures: Vec<SpawnFailure>,
}

/// Handle to a running queue: the event stream plus the control surface.
#[derive(Debug)]
pub struct RunHandle {
    /// Worker events in delivery order; closes after `Finished`.
    pub events: mpsc::UnboundedReceiver<WorkerEvent>,
    cancel: Arc<CancelToken>,
    worker: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Requests a cooperative stop: the worker terminates the active process
    /// and skips the remaining queue. Idempotent.
    pub fn stop(&self) {
        self.cancel.request_stop();
    }

    /// The run's cancellation token, for callers that need to stop from
    /// another task (e.g. a signal handler).
    pub fn cancel_token(&self) -> Arc<CancelToken> {
        Arc::clone(&self.cancel)
    }

    /// Waits for the worker task and returns its report.
    pub async fn join(self) -> anyhow::Result<RunReport> {
        self.worker.await.context("queue worker join")
    }
}

/// Filters blank entries and starts the worker task for the remaining URLs.
/// Fails with [`QueueError::EmptyQueue`] if nothing remains; no task is
/// spawned in that case. Must be called from within a tokio runtime.
pub fn submit(urls: &[String], settings: RunSettings) -> Result<RunHandle, QueueError> {
    let queue = jobs::filter_urls(urls);
    if queue.is_empty() {
        return Err(QueueError::EmptyQueue);
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let cancel = Arc::new(CancelToken::new());
    let worker_cancel = Arc::clone(&cancel);
    let worker = tokio::spawn(async move {
        run_queue(queue, settings, worker_cancel, events_tx).await
    });

    Ok(RunHandle {
        events: events_rx,
        cancel,
        worker,
    })
}

async fn run_queue(
    queue: Vec<String>,
    settings: RunSettings,
    cancel: Arc<CancelToken>,
    events: mpsc::UnboundedSender<WorkerEvent>,
) -> RunReport {
    let mut jobs_run = 0usize;
    let mut spawn_failures = Vec::new();

    for url in &queue {
        if cancel.is_stop_requested() {
            break;
        }

        let job = Job::new(url, settings.cookies_file.as_deref());
        tracing::info!(url = %job.url, "starting download job");

        let mut source = match ProcessSource::start(&settings.downloader, &job.args) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(url = %job.url, "downloader spawn failed: {}", err);
                let _ = events.send(WorkerEvent::RawLine(format!("Error: {err}")));
                spawn_failures.push(SpawnFailure {
                    url: job.url.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        jobs_run += 1;

        // Fresh progress state per job, so one playlist job cannot suppress
        // per-file progress of the jobs after it.
        let mut progress = ProgressState::new();
        let mut terminated = false;

        loop {
            tokio::select! {
                biased;
                maybe_line = source.next_line() => {
                    let Some(line) = maybe_line else { break };
                    if let Some(event) = progress.observe(&line) {
                        let _ = events.send(WorkerEvent::Progress(event));
                    }
                    let _ = events.send(WorkerEvent::RawLine(line));
                    if cancel.is_stop_requested() {
                        source.request_termination();
                        terminated = true;
                        break;
                    }
                }
                _ = cancel.stop_requested() => {
                    source.request_termination();
                    terminated = true;
                    break;
                }
            }
        }

        let waited = if terminated {
            source.wait_or_kill(settings.kill_grace).await
        } else {
            source.wait().await
        };
        match waited {
            // Exit status is observed but never classifies the run.
            Ok(status) => tracing::debug!(url = %job.url, %status, "downloader exited"),
            Err(err) => tracing::warn!(url = %job.url, "wait for downloader failed: {}", err),
        }

        if cancel.is_stop_requested() {
            break;
        }
    }

    let result = if cancel.is_stop_requested() {
        cancel.mark_stopped();
        RunResult::StoppedByUser
    } else {
        RunResult::CompletedNormally
    };
    let _ = events.send(WorkerEvent::Finished(result));
    tracing::info!(?result, jobs_run, "queue run finished");

    RunReport {
        result,
        jobs_run,
        spawn_failures,
    }
}
