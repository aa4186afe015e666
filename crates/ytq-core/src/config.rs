use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

fn default_downloader() -> String {
    "yt-dlp".to_string()
}

fn default_kill_grace_secs() -> u64 {
    5
}

/// Global configuration loaded from `~/.config/ytq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtqConfig {
    /// Downloader executable to invoke (name on PATH or absolute path).
    #[serde(default = "default_downloader")]
    pub downloader: String,
    /// Optional browser-exported cookie-jar file passed via `--cookies`.
    /// Persisted here so it survives between runs.
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,
    /// Seconds to wait after a termination request before hard-killing the
    /// downloader process.
    #[serde(default = "default_kill_grace_secs")]
    pub kill_grace_secs: u64,
}

impl Default for YtqConfig {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            cookies_file: None,
            kill_grace_secs: default_kill_grace_secs(),
        }
    }
}

/// Configuration-time validation failures. These fail the call that raised
/// them and never abort a run already in progress.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured cookie path does not point at a readable file.
    #[error("cookie file not found or not a regular file: {0}")]
    CookieFileNotFound(PathBuf),
}

/// Validated per-run settings derived from the config.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub downloader: String,
    pub cookies_file: Option<PathBuf>,
    pub kill_grace: Duration,
}

impl RunSettings {
    /// Validates the config for a run. A configured cookie path is checked
    /// here, at configuration time, not when a job launches.
    pub fn from_config(cfg: &YtqConfig) -> Result<Self, ConfigError> {
        if let Some(path) = &cfg.cookies_file {
            if !path.is_file() {
                return Err(ConfigError::CookieFileNotFound(path.clone()));
            }
        }
        Ok(Self {
            downloader: cfg.downloader.clone(),
            cookies_file: cfg.cookies_file.clone(),
            kill_grace: Duration::from_secs(cfg.kill_grace_secs),
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<YtqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = YtqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: YtqConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Persist the configuration (e.g. after changing the cookie file path).
pub fn save(cfg: &YtqConfig) -> Result<()> {
    let path = config_path()?;
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, toml)?;
    Ok(())
}
