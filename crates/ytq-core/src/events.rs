//! Event types delivered from the worker task to the listener (the UI shell).

/// Normalized progress derived from raw downloader output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Percent of the current single file, 0-100.
    File { percent: u8 },
    /// Playlist position (1-based) and the derived overall percent.
    Playlist { current: u32, total: u32, percent: u8 },
}

impl ProgressEvent {
    /// The percent carried by the event, whatever its kind.
    pub fn percent(&self) -> u8 {
        match self {
            ProgressEvent::File { percent } => *percent,
            ProgressEvent::Playlist { percent, .. } => *percent,
        }
    }
}

/// Terminal outcome of a whole queue run. Decided solely by whether a stop
/// was requested before the queue drained; per-job exit statuses do not
/// change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    CompletedNormally,
    StoppedByUser,
}

/// Messages sent over the run's event channel, in delivery order: for each
/// output line an optional `Progress` followed by the `RawLine` itself, and
/// exactly one `Finished` at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    RawLine(String),
    Progress(ProgressEvent),
    Finished(RunResult),
}
