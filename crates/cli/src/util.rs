//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use driftsync_core::{config_file_path, SyncConfig};
use indicatif::{ProgressBar, ProgressStyle};
use remote::{RemoteError, TokenStore};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load the configuration from `explicit` or the default location
///
/// A missing file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<SyncConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Some(path) => path,
            None => return Ok(SyncConfig::default()),
        },
    };

    SyncConfig::load_from(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Canonical directory to operate on, defaulting to the current one
pub fn resolve_root(path: Option<PathBuf>) -> Result<PathBuf> {
    let root = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))
}

pub fn token_store() -> Result<TokenStore> {
    TokenStore::open_default().context("Failed to locate token store")
}

/// Token from `DRIFT_TOKEN` or the token store
pub fn require_token() -> Result<String> {
    token_store()?
        .resolve()
        .context("Failed to read token")?
        .ok_or(RemoteError::NotLinked)
        .map_err(Into::into)
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
