//! List available spaces

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use remote::{RemoteClient, Space};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = util::load_config(config_path)?;
    let token = util::require_token()?;

    let spaces = RemoteClient::new(&config.api_base_url)
        .list_spaces(&token)
        .await
        .context("Failed to fetch spaces")?;

    if spaces.is_empty() {
        println!("No spaces available.");
        return Ok(());
    }

    print_spaces(&spaces);
    Ok(())
}

pub fn print_spaces(spaces: &[Space]) {
    println!("{}", "Spaces".bold());
    let width = spaces.iter().map(|s| s.id.len()).max().unwrap_or(0);
    for space in spaces {
        println!("  {:width$}  {}", space.id.cyan(), space.name);
    }
}
