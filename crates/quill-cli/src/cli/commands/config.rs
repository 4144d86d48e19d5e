//! Config command handlers.

use anyhow::{Context, Result};
use quill_core::config;

pub fn path() -> Result<()> {
    println!("{}", config::paths::config_path().display());
    Ok(())
}

pub fn set_url(url: &str) -> Result<()> {
    config::Config::save_base_url(url).with_context(|| format!("set base URL to {url}"))?;
    println!("Base URL set to {}", url.trim_end_matches('/'));
    Ok(())
}
