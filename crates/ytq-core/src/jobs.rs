//! Job model: queue filtering and the downloader argument template.

use std::path::Path;

/// Output naming template passed to the downloader.
pub const OUTPUT_TEMPLATE: &str = "%(playlist_index)s - %(title)s.%(ext)s";

/// One queued URL and its derived downloader invocation. Immutable once built.
#[derive(Debug, Clone)]
pub struct Job {
    pub url: String,
    pub args: Vec<String>,
}

impl Job {
    pub fn new(url: &str, cookies_file: Option<&Path>) -> Self {
        Self {
            url: url.to_string(),
            args: build_args(url, cookies_file),
        }
    }
}

/// Drops blank and whitespace-only entries, trimming the rest. Order is kept.
pub fn filter_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    urls.iter()
        .map(|u| u.as_ref().trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fixed downloader argument template: IPv4 only, best video+audio merged
/// into mp4, playlist-index output naming. `--cookies` appears only when a
/// cookie file is configured; the URL is always the final argument.
pub fn build_args(url: &str, cookies_file: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "-4".to_string(),
        "-f".to_string(),
        "bestvideo+bestaudio".to_string(),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
    ];
    if let Some(path) = cookies_file {
        args.push("--cookies".to_string());
        args.push(path.display().to_string());
    }
    args.push("-o".to_string());
    args.push(OUTPUT_TEMPLATE.to_string());
    args.push(url.to_string());
    args
}
