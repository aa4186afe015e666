//! `ytq cookies` – show, set, or clear the persisted cookie file.

use anyhow::Result;
use std::path::PathBuf;

use ytq_core::config;

pub fn run_cookies(path: Option<PathBuf>, clear: bool) -> Result<()> {
    let mut cfg = config::load_or_init()?;

    if clear {
        cfg.cookies_file = None;
        config::save(&cfg)?;
        println!("Cookie file cleared.");
        return Ok(());
    }

    match path {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("not a file: {}", path.display());
            }
            cfg.cookies_file = Some(path.clone());
            config::save(&cfg)?;
            println!("Cookie file set to {}", path.display());
        }
        None => match &cfg.cookies_file {
            Some(p) => println!("Cookie file: {}", p.display()),
            None => println!("No cookie file configured."),
        },
    }
    Ok(())
}
