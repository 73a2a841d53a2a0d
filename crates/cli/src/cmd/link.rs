//! Link the repository and keep the remote index up to date

use crate::cmd::spaces::print_spaces;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use remote::{choose_space, repo_name, HttpUploadSink, Link, RemoteClient, RemoteError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use watcher::WatchSession;

pub async fn run(
    config_path: Option<&Path>,
    space: Option<String>,
    path: Option<PathBuf>,
    quiet_period_ms: Option<u64>,
) -> Result<()> {
    let mut config = util::load_config(config_path)?;
    if let Some(ms) = quiet_period_ms {
        config = config.with_quiet_period(Duration::from_millis(ms));
        config.validate().context("Invalid --quiet-period-ms")?;
    }

    let root = util::resolve_root(path)?;
    let token = util::require_token()?;
    let client = RemoteClient::new(&config.api_base_url);

    let spaces = client
        .list_spaces(&token)
        .await
        .context("Failed to fetch spaces")?;
    let space = match choose_space(&spaces, space.as_deref()) {
        Ok(space) => space.clone(),
        Err(e @ (RemoteError::AmbiguousSpace(_) | RemoteError::UnknownSpace(_))) => {
            print_spaces(&spaces);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let repo = repo_name(&root);
    let link = Link::resolve(&client, &token, &space.id, &repo)
        .await
        .context("Failed to look up linked repositories")?;

    let sink = Arc::new(HttpUploadSink::new(client, token, link, &root));
    let session =
        WatchSession::new(&root, config, sink).context("Failed to load ignore rules")?;

    let spinner = util::spinner(format!("Uploading {} to {}", repo, space.name));
    let uploaded = session.initial_upload().await;
    spinner.finish_and_clear();
    let (count, context_id) = uploaded.context("Initial upload failed")?;

    println!(
        "{} Uploaded {} files to {} {}",
        "✓".green(),
        count,
        space.name.bold(),
        format!("({context_id})").dimmed()
    );

    let source = session
        .start_source()
        .context("Failed to start watching")?;
    println!(
        "Watching {} for changes {}",
        root.display().cyan(),
        "(Ctrl-C to stop)".dimmed()
    );

    let summary = session
        .run(source, shutdown_signal())
        .await
        .context("Watch session ended")?;

    println!(
        "\nStopped after {} uploads ({} files, {} failed)",
        summary.flushes, summary.files_uploaded, summary.failed_uploads
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
