//! End-to-end queue runs against a fake downloader shell script.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use tempfile::TempDir;
use ytq_core::config::RunSettings;
use ytq_core::events::{ProgressEvent, RunResult, WorkerEvent};
use ytq_core::queue::{self, RunHandle};

fn write_script(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

fn settings_for(downloader: String) -> RunSettings {
    RunSettings {
        downloader,
        cookies_file: None,
        kill_grace: Duration::from_secs(2),
    }
}

async fn drain(handle: &mut RunHandle) -> Vec<WorkerEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn run_completes_and_keeps_progress_per_job() {
    let dir = TempDir::new().unwrap();
    // Branch on the URL (last argument) so the first job looks like a
    // playlist and the second like a single video.
    let script = write_script(
        &dir,
        "fake-yt-dlp",
        r#"eval "url=\${$#}"
case "$url" in
  *playlist*)
    echo '[download] Downloading item 1 of 2'
    echo '[download]  10.0% of 1.00MiB'
    ;;
  *)
    echo '[download]  42.5% of 1.00MiB'
    echo '[download] 100% of 1.00MiB in 00:01'
    ;;
esac"#,
    );

    let urls = vec![
        "".to_string(),
        "  ".to_string(),
        "https://x/playlist?list=1".to_string(),
        "https://x/video".to_string(),
    ];
    let mut handle = queue::submit(&urls, settings_for(script)).unwrap();
    let events = drain(&mut handle).await;
    let report = handle.join().await.unwrap();

    // Blank entries never reach the line source.
    assert_eq!(report.jobs_run, 2);
    assert_eq!(report.result, RunResult::CompletedNormally);
    assert!(report.spawn_failures.is_empty());

    let progress: Vec<ProgressEvent> = events
        .iter()
        .filter_map(|e| match e {
            WorkerEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    // Job 1: playlist marker, then its per-file percent is suppressed.
    // Job 2: fresh state, so per-file progress flows again.
    assert_eq!(
        progress,
        vec![
            ProgressEvent::Playlist { current: 1, total: 2, percent: 50 },
            ProgressEvent::File { percent: 42 },
            ProgressEvent::File { percent: 100 },
        ]
    );
    for event in &progress {
        assert!(event.percent() <= 100);
    }

    let raw_count = events
        .iter()
        .filter(|e| matches!(e, WorkerEvent::RawLine(_)))
        .count();
    assert_eq!(raw_count, 4);
    assert_eq!(
        events.last(),
        Some(&WorkerEvent::Finished(RunResult::CompletedNormally))
    );
}

#[tokio::test]
async fn jobs_run_strictly_sequentially() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("order.log");
    let script = write_script(
        &dir,
        "fake-yt-dlp",
        &format!(
            r#"echo "start $$" >> "{log}"
sleep 0.2
echo "end $$" >> "{log}"
echo '[download] 100% of 1.00MiB'"#,
            log = log_path.display()
        ),
    );

    let urls = vec!["https://x/1".to_string(), "https://x/2".to_string()];
    let mut handle = queue::submit(&urls, settings_for(script)).unwrap();
    drain(&mut handle).await;
    let report = handle.join().await.unwrap();
    assert_eq!(report.jobs_run, 2);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let markers: Vec<&str> = log
        .lines()
        .map(|l| l.split_whitespace().next().unwrap())
        .collect();
    // Job i+1 never starts before job i has ended.
    assert_eq!(markers, vec!["start", "end", "start", "end"]);
}

#[tokio::test]
async fn stop_mid_stream_skips_remaining_jobs() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "fake-yt-dlp",
        r#"echo '[download]   1.0% of 9.99MiB'
exec sleep 30"#,
    );

    let urls = vec!["https://x/1".to_string(), "https://x/2".to_string()];
    let mut handle = queue::submit(&urls, settings_for(script)).unwrap();

    // Wait for the first raw line, then stop (twice: stop is idempotent).
    let mut seen_events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        let is_raw = matches!(event, WorkerEvent::RawLine(_));
        seen_events.push(event);
        if is_raw {
            break;
        }
    }
    handle.stop();
    handle.stop();
    seen_events.extend(drain(&mut handle).await);
    let report = handle.join().await.unwrap();

    assert_eq!(report.result, RunResult::StoppedByUser);
    // The second job never started.
    assert_eq!(report.jobs_run, 1);
    assert_eq!(
        seen_events.last(),
        Some(&WorkerEvent::Finished(RunResult::StoppedByUser))
    );
}

#[tokio::test]
async fn stop_before_first_job_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "fake-yt-dlp", "echo should-not-run");

    let urls = vec!["https://x/1".to_string()];
    let mut handle = queue::submit(&urls, settings_for(script)).unwrap();
    handle.stop();
    let events = drain(&mut handle).await;
    let report = handle.join().await.unwrap();

    assert_eq!(report.result, RunResult::StoppedByUser);
    // The worker may have started the first job before observing the stop,
    // but it must not have advanced past it.
    assert!(report.jobs_run <= 1);
    assert_eq!(
        events.last(),
        Some(&WorkerEvent::Finished(RunResult::StoppedByUser))
    );
}

#[tokio::test]
async fn spawn_failure_becomes_error_line_and_run_continues() {
    let settings = settings_for("/nonexistent/ytq-downloader".to_string());
    let urls = vec!["https://x/1".to_string(), "https://x/2".to_string()];
    let mut handle = queue::submit(&urls, settings).unwrap();
    let events = drain(&mut handle).await;
    let report = handle.join().await.unwrap();

    assert_eq!(report.result, RunResult::CompletedNormally);
    assert_eq!(report.jobs_run, 0);
    assert_eq!(report.spawn_failures.len(), 2);
    assert_eq!(report.spawn_failures[0].url, "https://x/1");
    assert_eq!(report.spawn_failures[1].url, "https://x/2");

    let error_lines: Vec<&String> = events
        .iter()
        .filter_map(|e| match e {
            WorkerEvent::RawLine(line) => Some(line),
            _ => None,
        })
        .collect();
    assert_eq!(error_lines.len(), 2);
    for line in error_lines {
        assert!(line.starts_with("Error: "), "unexpected line: {line}");
    }
    assert_eq!(
        events.last(),
        Some(&WorkerEvent::Finished(RunResult::CompletedNormally))
    );
}

#[tokio::test]
async fn cookie_file_is_passed_through_to_the_downloader() {
    let dir = TempDir::new().unwrap();
    let cookie_path = dir.path().join("cookies.txt");
    std::fs::write(&cookie_path, "# Netscape HTTP Cookie File\n").unwrap();
    // Echo the full argv so the test can assert on the command line.
    let script = write_script(&dir, "fake-yt-dlp", r#"echo "argv: $*""#);

    let with_cookies = RunSettings {
        downloader: script.clone(),
        cookies_file: Some(cookie_path.clone()),
        kill_grace: Duration::from_secs(2),
    };
    let urls = vec!["https://x/1".to_string()];
    let mut handle = queue::submit(&urls, with_cookies).unwrap();
    let events = drain(&mut handle).await;
    let argv_line = events
        .iter()
        .find_map(|e| match e {
            WorkerEvent::RawLine(line) if line.starts_with("argv: ") => Some(line.clone()),
            _ => None,
        })
        .unwrap();
    assert!(argv_line.contains("--cookies"));
    assert!(argv_line.contains(&cookie_path.display().to_string()));
    handle.join().await.unwrap();

    let without_cookies = settings_for(script);
    let mut handle = queue::submit(&urls, without_cookies).unwrap();
    let events = drain(&mut handle).await;
    let argv_line = events
        .iter()
        .find_map(|e| match e {
            WorkerEvent::RawLine(line) if line.starts_with("argv: ") => Some(line.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!argv_line.contains("--cookies"));
    handle.join().await.unwrap();
}
