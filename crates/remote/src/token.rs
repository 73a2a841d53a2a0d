//! Bearer token persistence
//!
//! The token lives in `~/.driftsync/token`, readable only by the owner.
//! `DRIFT_TOKEN` takes precedence over the stored file.

use crate::error::{RemoteError, Result};
use driftsync_core::TokenProvider;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that overrides the stored token
pub const TOKEN_ENV: &str = "DRIFT_TOKEN";

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.driftsync/token`
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| RemoteError::Token {
            path: PathBuf::from("~/.driftsync/token"),
            source: io::Error::new(io::ErrorKind::NotFound, "home directory not found"),
        })?;
        Ok(Self::new(home.join(".driftsync").join("token")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, `None` when absent or blank
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(non_blank(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.error(source)),
        }
    }

    /// Environment override first, then the stored token
    pub fn resolve(&self) -> Result<Option<String>> {
        if let Some(token) = std::env::var(TOKEN_ENV).ok().and_then(non_blank) {
            debug!("using token from {TOKEN_ENV}");
            return Ok(Some(token));
        }
        self.load()
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            create_private_dir(dir).map_err(|source| RemoteError::Token {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        write_private(&self.path, token.trim()).map_err(|source| self.error(source))
    }

    /// Remove the stored token. Returns false when there was none.
    pub fn delete(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.error(source)),
        }
    }

    fn error(&self, source: io::Error) -> RemoteError {
        RemoteError::Token {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenProvider for TokenStore {
    fn token(&self) -> Option<String> {
        match self.resolve() {
            Ok(token) => token,
            Err(e) => {
                warn!("failed to read token: {e}");
                None
            }
        }
    }
}

fn non_blank(token: String) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}
