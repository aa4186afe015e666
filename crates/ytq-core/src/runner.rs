//! Line source: one external downloader process and its merged output stream.
//!
//! Owns exactly one child process for the lifetime of one job. Stdout and
//! stderr are piped separately and merged into a single line channel by two
//! reader tasks, so the orchestrator sees one lazy sequence of text lines.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// The downloader executable could not be launched. The orchestrator turns
/// this into a synthetic "Error: ..." output line and moves on to the next
/// job; it is never fatal for the run.
#[derive(Debug, Error)]
#[error("could not launch {program}: {message}")]
pub struct SpawnError {
    pub program: String,
    pub message: String,
}

/// One running downloader process with its merged stdout/stderr line stream.
/// The stream is finite and not restartable.
#[derive(Debug)]
pub struct ProcessSource {
    child: Child,
    lines: mpsc::UnboundedReceiver<String>,
}

impl ProcessSource {
    /// Spawns the process with stdout and stderr piped into one line channel.
    pub fn start(program: &str, args: &[String]) -> Result<Self, SpawnError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SpawnError {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx));
        }
        Ok(Self { child, lines: rx })
    }

    /// Next output line, or None once the process has closed both streams.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Best-effort termination signal. Failures (e.g. the process already
    /// exited) are swallowed.
    pub fn request_termination(&mut self) {
        let _ = self.child.start_kill();
    }

    /// Blocks until the process has fully exited.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Waits up to `grace` for the process to exit, then hard-kills it. Used
    /// after a termination request so a process that ignores the signal
    /// cannot block the run indefinitely.
    pub async fn wait_or_kill(&mut self, grace: Duration) -> std::io::Result<ExitStatus> {
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "process still alive after termination request, killing"
                );
                self.child.kill().await?;
                self.child.wait().await
            }
        }
    }
}

async fn forward_lines<R>(stream: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).is_err() {
            break;
        }
    }
}
