//! Store an access token

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

pub async fn run(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }

    let store = util::token_store()?;
    store.save(token).context("Failed to save token")?;

    println!(
        "{} Token saved to {}",
        "✓".green(),
        store.path().display().dimmed()
    );
    Ok(())
}
