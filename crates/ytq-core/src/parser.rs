//! Stateful parser turning raw downloader output lines into progress events.
//!
//! Recognizes the yt-dlp progress vocabulary: playlist item markers
//! ("[download] Downloading item X of Y"), per-file percent lines
//! ("[download]  12.3% of ..."), destination lines, and completion lines.
//! Once a playlist marker is seen, per-file percents are suppressed for the
//! rest of that job.

use crate::events::ProgressEvent;

const DOWNLOAD_TAG: &str = "[download]";
const PLAYLIST_MARKER: &str = "[download] Downloading item";
const DESTINATION_MARKER: &str = "[download] Destination:";
const COMPLETE_MARKER: &str = "[download] 100%";
const ALREADY_DOWNLOADED_MARKER: &str = "has already been downloaded";

/// What kind of progress the current job has been reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    None,
    PerFile,
    Playlist,
}

/// Mutable progress state for one job. Create a fresh one per job, so a
/// playlist job cannot suppress per-file progress of the jobs after it.
#[derive(Debug, Default)]
pub struct ProgressState {
    mode: ProgressMode,
    percent: u8,
    playlist_current: Option<u32>,
    playlist_total: Option<u32>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ProgressMode {
        self.mode
    }

    /// Last known percent, 0-100.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn playlist_position(&self) -> Option<(u32, u32)> {
        Some((self.playlist_current?, self.playlist_total?))
    }

    /// Consumes one output line, returning at most one progress event.
    /// Unrecognized lines change nothing.
    pub fn observe(&mut self, line: &str) -> Option<ProgressEvent> {
        if let Some((current, total)) = parse_playlist_marker(line) {
            let percent = (u64::from(current) * 100 / u64::from(total)).min(100) as u8;
            self.mode = ProgressMode::Playlist;
            self.playlist_current = Some(current);
            self.playlist_total = Some(total);
            self.percent = percent;
            return Some(ProgressEvent::Playlist { current, total, percent });
        }

        // Playlist mode wins for the rest of the job: from here on, only new
        // playlist markers are recognized.
        if self.mode == ProgressMode::Playlist {
            return None;
        }

        if let Some(percent) = parse_percent_marker(line) {
            self.mode = ProgressMode::PerFile;
            self.percent = percent;
            return Some(ProgressEvent::File { percent });
        }

        if line.contains(DESTINATION_MARKER) || line.contains(PLAYLIST_MARKER) {
            // A new file is starting but no percent was printed yet.
            self.percent = 0;
            return Some(ProgressEvent::File { percent: 0 });
        }

        if line.contains(COMPLETE_MARKER) || line.contains(ALREADY_DOWNLOADED_MARKER) {
            self.percent = 100;
            return Some(ProgressEvent::File { percent: 100 });
        }

        None
    }
}

/// Parses "[download] Downloading item X of Y" (1-based X, positive Y).
fn parse_playlist_marker(line: &str) -> Option<(u32, u32)> {
    let idx = line.find(PLAYLIST_MARKER)?;
    let rest = line[idx + PLAYLIST_MARKER.len()..].trim_start();
    let mut words = rest.split_whitespace();
    let current: u32 = words.next()?.parse().ok()?;
    if words.next()? != "of" {
        return None;
    }
    let total_word = words.next()?;
    let digits_end = total_word
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(total_word.len());
    let total: u32 = total_word[..digits_end].parse().ok()?;
    if current == 0 || total == 0 {
        return None;
    }
    Some((current, total))
}

/// Parses the per-file percent marker: a "NN.N%" token (decimal point
/// required) right after the "[download]" tag. Values outside 0.0-100.0 are
/// rejected; the result truncates toward zero.
fn parse_percent_marker(line: &str) -> Option<u8> {
    let idx = line.find(DOWNLOAD_TAG)?;
    let rest = &line[idx + DOWNLOAD_TAG.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let token = rest.split_whitespace().next()?;
    let number = token.strip_suffix('%')?;
    if !number.contains('.') || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    if !(0.0..=100.0).contains(&value) {
        return None;
    }
    Some(value as u8)
}
