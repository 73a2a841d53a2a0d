//! Linking a local repository to a space

use crate::client::{RemoteClient, Space};
use crate::error::{RemoteError, Result};
use driftsync_core::ContextId;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Where uploads for one repository go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub space_id: String,
    pub repo_name: String,
    /// Context of a previous link with the same name; `None` creates a new one
    pub context_id: Option<ContextId>,
}

impl Link {
    /// Look up `repo_name` among the repositories already in the space
    pub async fn resolve(
        client: &RemoteClient,
        token: &str,
        space_id: &str,
        repo_name: &str,
    ) -> Result<Self> {
        let repos = client.list_repositories(token, space_id).await?;
        let context_id = repos
            .into_iter()
            .find(|repo| repo.name == repo_name)
            .map(|repo| repo.context_id);

        match &context_id {
            Some(id) => info!(repo = repo_name, context_id = %id, "repository already linked"),
            None => info!(repo = repo_name, "linking new repository"),
        }

        Ok(Self {
            space_id: space_id.to_string(),
            repo_name: repo_name.to_string(),
            context_id,
        })
    }
}

/// Pick the space to link into
///
/// An explicit request must name an available space id. Without one, a
/// single available space is chosen automatically.
pub fn choose_space<'a>(spaces: &'a [Space], requested: Option<&str>) -> Result<&'a Space> {
    if let Some(id) = requested {
        return spaces
            .iter()
            .find(|space| space.id == id)
            .ok_or_else(|| RemoteError::UnknownSpace(id.to_string()));
    }

    match spaces {
        [] => Err(RemoteError::NoSpaces),
        [only] => Ok(only),
        _ => Err(RemoteError::AmbiguousSpace(spaces.len())),
    }
}

/// Name the repository at `root` is known by
///
/// Taken from the `origin` remote URL when there is one, otherwise the
/// directory name.
pub fn repo_name(root: &Path) -> String {
    let remote = Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .current_dir(root)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| name_from_remote_url(&String::from_utf8_lossy(&output.stdout)));

    if let Some(name) = remote {
        debug!(repo = %name, "repository name from origin remote");
        return name;
    }

    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Last segment of a remote URL without the `.git` suffix
fn name_from_remote_url(url: &str) -> Option<String> {
    let url = url.trim();
    let url = url.strip_suffix(".git").unwrap_or(url);
    let name = url.rsplit(['/', ':']).next()?;
    (!name.is_empty()).then(|| name.to_string())
}
