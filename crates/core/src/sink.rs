//! Seams to the remote indexing service

use crate::record::FileRecord;
use async_trait::async_trait;

/// Identifier the indexing service assigns to an uploaded repository
pub type ContextId = String;

/// Failure reported by an upload sink
#[derive(Debug, thiserror::Error)]
#[error("upload failed: {source}")]
pub struct UploadError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl UploadError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Receives batches of changed files
///
/// Called once with the full initial scan (`incremental == false`) and
/// once per debounce flush afterwards (`incremental == true`).
#[async_trait]
pub trait UploadSink: Send + Sync + 'static {
    async fn upload(
        &self,
        files: Vec<FileRecord>,
        incremental: bool,
    ) -> Result<ContextId, UploadError>;
}

/// Supplies the bearer credential used by an upload sink
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl TokenProvider for String {
    fn token(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.clone())
        }
    }
}
