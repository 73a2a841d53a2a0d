//! Common utilities for watcher integration tests

use async_trait::async_trait;
use driftsync_core::{ContextId, FileRecord, UploadError, UploadSink};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, Notify};
use watcher::{ChangeKind, EventSource, PathEvent, Result, WatchError};

/// Event source fed by the test through a channel
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Result<PathEvent>>,
    pub watch_set: HashSet<PathBuf>,
}

#[derive(Clone)]
pub struct EventFeed {
    tx: mpsc::UnboundedSender<Result<PathEvent>>,
}

impl EventFeed {
    pub fn write(&self, path: &Path) {
        self.send(PathEvent::observe(path.to_path_buf(), ChangeKind::Write));
    }

    pub fn create(&self, path: &Path) {
        self.send(PathEvent::observe(path.to_path_buf(), ChangeKind::Create));
    }

    pub fn send(&self, event: PathEvent) {
        self.tx.send(Ok(event)).unwrap();
    }

    pub fn fail(&self) {
        let err = WatchError::Notify(notify::Error::generic("queue overflow"));
        self.tx.send(Err(err)).unwrap();
    }
}

pub fn channel_source() -> (ChannelSource, EventFeed) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ChannelSource {
            rx,
            watch_set: HashSet::new(),
        },
        EventFeed { tx },
    )
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<Result<PathEvent>> {
        self.rx.recv().await
    }

    fn watch_dir(&mut self, dir: &Path) -> Result<bool> {
        Ok(self.watch_set.insert(dir.to_path_buf()))
    }

    fn watched(&self) -> usize {
        self.watch_set.len()
    }
}

/// Upload sink that records every batch
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<(Vec<FileRecord>, bool)>>,
    failures_left: AtomicUsize,
}

impl RecordingSink {
    /// Sink that rejects its first `n` uploads
    pub fn failing(n: usize) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(n),
        }
    }

    pub fn batches(&self) -> Vec<(Vec<FileRecord>, bool)> {
        self.batches.lock().clone()
    }

    pub fn incremental(&self) -> Vec<Vec<FileRecord>> {
        self.batches()
            .into_iter()
            .filter(|(_, incremental)| *incremental)
            .map(|(files, _)| files)
            .collect()
    }
}

#[async_trait]
impl UploadSink for RecordingSink {
    async fn upload(
        &self,
        files: Vec<FileRecord>,
        incremental: bool,
    ) -> std::result::Result<ContextId, UploadError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(UploadError::new("service unavailable"));
        }

        self.batches.lock().push((files, incremental));
        Ok("ctx-1".to_string())
    }
}

/// Upload sink whose first upload waits until `release` is called
///
/// Completed batches are recorded in completion order.
#[derive(Default)]
pub struct GatedSink {
    gate: Notify,
    started: AtomicUsize,
    completed: Mutex<Vec<Vec<FileRecord>>>,
}

impl GatedSink {
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> Vec<Vec<FileRecord>> {
        self.completed.lock().clone()
    }
}

#[async_trait]
impl UploadSink for GatedSink {
    async fn upload(
        &self,
        files: Vec<FileRecord>,
        _incremental: bool,
    ) -> std::result::Result<ContextId, UploadError> {
        if self.started.fetch_add(1, Ordering::SeqCst) == 0 {
            self.gate.notified().await;
        }
        self.completed.lock().push(files);
        Ok("ctx-1".to_string())
    }
}
