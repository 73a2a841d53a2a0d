//! Dry run of the initial upload

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use watcher::IgnoreRules;

pub async fn run(config_path: Option<&Path>, path: Option<PathBuf>) -> Result<()> {
    let config = util::load_config(config_path)?;
    let root = util::resolve_root(path)?;

    let rules = IgnoreRules::load(&root, &config).context("Failed to load ignore rules")?;
    let files = watcher::scan(&rules, &config).context("Scan failed")?;

    let mut total_bytes = 0;
    for file in &files {
        let rel = file.path.strip_prefix(rules.root()).unwrap_or(&file.path);
        total_bytes += file.content.len();
        println!(
            "{}  {}",
            rel.display(),
            format!("{} B", file.content.len()).dimmed()
        );
    }

    println!(
        "\n{} files, {} bytes {}",
        files.len().to_string().bold(),
        total_bytes,
        format!("({} ignore sources)", rules.active_sources()).dimmed()
    );
    Ok(())
}
