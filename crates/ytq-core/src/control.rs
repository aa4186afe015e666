//! Cooperative cancellation: a shared tri-state token checked between line reads.
//!
//! Requesting a stop does not stop anything by itself; the worker observes the
//! token after each delivered line (and through the notify wakeup while it is
//! blocked on a read) and terminates the active downloader process.

use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::Notify;

const RUNNING: u8 = 0;
const STOP_REQUESTED: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle of one run. Monotonic: Running -> StopRequested -> Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    StopRequested,
    Stopped,
}

/// Shared cancellation token for one run, held by Arc on both sides.
/// The atomic phase is the only value written from the caller's thread.
#[derive(Debug, Default)]
pub struct CancelToken {
    phase: AtomicU8,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a cooperative stop. Returns true on the first call; repeated
    /// calls (or calls after the run already stopped) have no further effect.
    pub fn request_stop(&self) -> bool {
        let prev = self.phase.fetch_max(STOP_REQUESTED, Ordering::Relaxed);
        self.notify.notify_one();
        prev == RUNNING
    }

    pub fn is_stop_requested(&self) -> bool {
        self.phase.load(Ordering::Relaxed) >= STOP_REQUESTED
    }

    /// Marks the run terminal after a stop was observed. Worker-side only.
    pub fn mark_stopped(&self) {
        self.phase.fetch_max(STOPPED, Ordering::Relaxed);
    }

    pub fn phase(&self) -> RunPhase {
        match self.phase.load(Ordering::Relaxed) {
            RUNNING => RunPhase::Running,
            STOP_REQUESTED => RunPhase::StopRequested,
            _ => RunPhase::Stopped,
        }
    }

    /// Resolves once a stop has been requested. The worker awaits this while
    /// blocked on the next output line. `notify_one` stores a permit when no
    /// waiter is registered, so a stop between the check and the await is not
    /// lost; there is a single consumer per run.
    pub async fn stop_requested(&self) {
        while !self.is_stop_requested() {
            self.notify.notified().await;
        }
    }
}
