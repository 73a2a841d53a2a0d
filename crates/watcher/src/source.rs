//! Filesystem event source
//!
//! Wraps a `notify` watcher with one non-recursive subscription per
//! directory. The set of watched directories only grows during a session;
//! new subdirectories are added as their create events arrive.

use crate::error::{Result, WatchError};
use crate::ignore::IgnoreRules;
use async_trait::async_trait;
use driftsync_core::SyncConfig;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Kind of change observed on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Write,
    Create,
    PermissionChange,
}

/// A single filesystem change
///
/// `is_dir` and `is_file` describe the path itself, never a symlink
/// target; both are false for symlinks, FIFOs, sockets, devices and
/// paths that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
    pub is_dir: bool,
    pub is_file: bool,
}

impl PathEvent {
    /// Build an event, resolving what the path currently is
    pub fn observe(path: PathBuf, kind: ChangeKind) -> Self {
        let file_type = std::fs::symlink_metadata(&path).map(|m| m.file_type()).ok();
        Self {
            is_dir: file_type.is_some_and(|t| t.is_dir()),
            is_file: file_type.is_some_and(|t| t.is_file()),
            path,
            kind,
        }
    }
}

/// Stream of path events plus control over the watched directory set
#[async_trait]
pub trait EventSource: Send {
    /// Next event; `None` once the stream has closed
    async fn next_event(&mut self) -> Option<Result<PathEvent>>;

    /// Subscribe a directory. Returns false if it was already watched.
    fn watch_dir(&mut self, dir: &Path) -> Result<bool>;

    /// Number of watched directories
    fn watched(&self) -> usize;
}

/// Event source backed by the platform's recommended notify watcher
pub struct FsEventSource {
    watcher: RecommendedWatcher,
    watch_set: HashSet<PathBuf>,
    rx: mpsc::Receiver<notify::Result<Event>>,
    queued: VecDeque<PathEvent>,
}

impl FsEventSource {
    /// Create the watcher and subscribe every non-excluded directory
    ///
    /// Failing to watch the root is fatal; failing to watch a nested
    /// directory is logged and skipped.
    pub fn start(rules: &IgnoreRules, config: &SyncConfig) -> Result<Self> {
        let (tx, rx) = mpsc::channel(config.event_buffer);

        let watcher = RecommendedWatcher::new(
            move |res| {
                // Receiver gone means the session ended
                let _ = tx.blocking_send(res);
            },
            notify::Config::default(),
        )?;

        let mut source = Self {
            watcher,
            watch_set: HashSet::new(),
            rx,
            queued: VecDeque::new(),
        };

        source.watch_dir(rules.root())?;

        for entry in WalkDir::new(rules.root())
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !rules.matches(e.path()))
        {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Err(e) = source.watch_dir(entry.path()) {
                warn!(path = %entry.path().display(), "failed to watch directory: {e}");
            }
        }

        info!(
            root = %rules.root().display(),
            directories = source.watch_set.len(),
            "watching directory tree"
        );
        Ok(source)
    }
}

#[async_trait]
impl EventSource for FsEventSource {
    async fn next_event(&mut self) -> Option<Result<PathEvent>> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(Ok(event));
            }

            match self.rx.recv().await? {
                Ok(event) => self.queued.extend(map_event(event)),
                Err(e) => return Some(Err(WatchError::Notify(e))),
            }
        }
    }

    fn watch_dir(&mut self, dir: &Path) -> Result<bool> {
        if self.watch_set.contains(dir) {
            return Ok(false);
        }

        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watch_set.insert(dir.to_path_buf());
        debug!(path = %dir.display(), "watching directory");
        Ok(true)
    }

    fn watched(&self) -> usize {
        self.watch_set.len()
    }
}

/// Classify a notify event kind
///
/// Removals and accesses carry nothing to upload and are dropped.
fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(ChangeKind::PermissionChange),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => None,
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Create),
        EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Write),
        EventKind::Access(_) | EventKind::Remove(_) | EventKind::Other => None,
    }
}

/// Convert a notify event into path events
fn map_event(event: Event) -> Vec<PathEvent> {
    let Some(kind) = classify(&event.kind) else {
        return Vec::new();
    };

    // A paired rename lists [from, to]; only the destination exists now
    let paths = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.into_iter().last().into_iter().collect()
        }
        _ => event.paths,
    };

    paths
        .into_iter()
        .map(|path| PathEvent::observe(path, kind))
        .collect()
}
