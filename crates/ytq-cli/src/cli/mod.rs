//! CLI for the ytq queue downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_cookies, run_queue};

/// Top-level CLI for the ytq queue downloader.
#[derive(Debug, Parser)]
#[command(name = "ytq")]
#[command(about = "ytq: sequential yt-dlp queue downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the given URLs one after another.
    Run {
        /// URLs to download, in order. Blank entries are skipped.
        urls: Vec<String>,

        /// Read additional URLs from a file, one per line.
        #[arg(long, value_name = "PATH")]
        urls_file: Option<PathBuf>,

        /// Cookie-jar file for this run (overrides the configured one).
        #[arg(long, value_name = "PATH")]
        cookies: Option<PathBuf>,
    },

    /// Show or set the cookie file used by every run.
    Cookies {
        /// Path to a browser-exported cookie-jar text file.
        path: Option<PathBuf>,

        /// Forget the persisted cookie file.
        #[arg(long)]
        clear: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                urls,
                urls_file,
                cookies,
            } => run_queue(urls, urls_file, cookies).await?,
            CliCommand::Cookies { path, clear } => run_cookies(path, clear)?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
