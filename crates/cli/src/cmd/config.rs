//! Configuration display command

use crate::util;
use anyhow::{Context, Result};
use driftsync_core::{config_file_path, SyncConfig};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

pub async fn run(config_path: Option<&Path>, path_only: bool, example: bool) -> Result<()> {
    if example {
        print!("{}", SyncConfig::default().to_toml()?);
        return Ok(());
    }

    let location: Option<PathBuf> = config_path.map(Path::to_path_buf).or_else(config_file_path);

    if path_only {
        let location = location.context("Could not determine config file path")?;
        println!("{}", location.display());
        return Ok(());
    }

    let config = util::load_config(config_path)?;

    println!("{}", "Configuration".bold());
    match &location {
        Some(path) if path.exists() => {
            println!("{}: {}\n", "Location".dimmed(), path.display().dimmed())
        }
        Some(path) => println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            path.display().dimmed(),
            "(not found, using defaults)".dimmed()
        ),
        None => println!("{}\n", "(no config directory, using defaults)".dimmed()),
    }

    println!(
        "  {} = {} {}",
        "quiet_period_ms".cyan(),
        config.quiet_period.as_millis(),
        format!("({:.1}s)", config.quiet_period.as_secs_f64()).dimmed()
    );
    println!(
        "  {} = {}",
        "supported_extensions".cyan(),
        config.supported_extensions.join(" ")
    );
    println!(
        "  {} = {}",
        "builtin_ignores".cyan(),
        config.builtin_ignores.join(" ")
    );
    println!("  {} = {}", "ignore_file".cyan(), config.ignore_file);
    println!(
        "  {} = {}",
        "max_file_bytes".cyan(),
        match config.max_file_bytes {
            Some(limit) => limit.to_string(),
            None => "unlimited".to_string(),
        }
    );
    println!("  {} = {}", "skip_binary".cyan(), config.skip_binary);
    println!("  {} = {}", "event_buffer".cyan(), config.event_buffer);
    println!("  {} = {}", "api_base_url".cyan(), config.api_base_url);

    println!("\n{}", "Valid Ranges:".bold());
    println!("  quiet_period_ms: 100-3,600,000");
    println!("  event_buffer: at least 1");

    Ok(())
}
