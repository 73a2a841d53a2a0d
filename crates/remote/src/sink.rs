//! Upload sink backed by the indexing service

use crate::client::{ChunkRequest, RemoteClient};
use crate::error::RemoteError;
use crate::link::Link;
use async_trait::async_trait;
use driftsync_core::{ContextId, FileRecord, TokenProvider, UploadError, UploadSink};
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::debug;

/// Sends batches to `/cli/chunk` for one linked repository
///
/// Paths are sent relative to the watched root. The context id returned
/// by the first successful upload is reused for every later one.
pub struct HttpUploadSink<T: TokenProvider = String> {
    client: RemoteClient,
    token: T,
    root: PathBuf,
    space_id: String,
    repo_name: String,
    context_id: Mutex<Option<ContextId>>,
}

impl<T: TokenProvider> HttpUploadSink<T> {
    pub fn new(client: RemoteClient, token: T, link: Link, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            token,
            root: root.into(),
            space_id: link.space_id,
            repo_name: link.repo_name,
            context_id: Mutex::new(link.context_id),
        }
    }

    /// Context id uploads currently target
    pub fn context_id(&self) -> Option<ContextId> {
        self.context_id.lock().clone()
    }

    fn relative(&self, mut record: FileRecord) -> FileRecord {
        if let Ok(rel) = record.path.strip_prefix(&self.root) {
            record.path = rel.to_path_buf();
        }
        record
    }
}

#[async_trait]
impl<T: TokenProvider + 'static> UploadSink for HttpUploadSink<T> {
    async fn upload(
        &self,
        files: Vec<FileRecord>,
        incremental: bool,
    ) -> Result<ContextId, UploadError> {
        let token = self
            .token
            .token()
            .ok_or_else(|| UploadError::new(RemoteError::NotLinked))?;

        let files: Vec<FileRecord> = files.into_iter().map(|f| self.relative(f)).collect();
        let previous = self.context_id();

        let request = ChunkRequest {
            files: &files,
            token: &token,
            context_id: previous.as_deref(),
            context_name: &self.repo_name,
            space_id: (!self.space_id.is_empty()).then_some(self.space_id.as_str()),
            update: incremental,
        };

        let assigned = self
            .client
            .upload_chunk(&request)
            .await
            .map_err(UploadError::new)?;

        if assigned.is_empty() {
            return Ok(previous.unwrap_or_default());
        }

        debug!(files = files.len(), context_id = %assigned, "chunk accepted");
        *self.context_id.lock() = Some(assigned.clone());
        Ok(assigned)
    }
}
