//! Error types for the watcher

use driftsync_core::UploadError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Error)]
pub enum WatchError {
    /// Reading a specific path failed
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the directory tree failed
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The notification backend reported an error
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The event stream ended
    #[error("event source closed")]
    SourceClosed,

    /// The initial upload was rejected
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl WatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
