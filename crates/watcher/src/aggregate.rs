//! Pending change aggregation
//!
//! Accumulates the latest record per path between flushes. Owned by the
//! watch loop, which is the only writer, so no locking is involved.

use driftsync_core::FileRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Deduplicated set of changed files awaiting upload
#[derive(Debug, Default)]
pub struct ChangeAggregator {
    pending: HashMap<PathBuf, FileRecord>,
}

impl ChangeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its path
    ///
    /// Returns true when the path was not already pending.
    pub fn record(&mut self, record: FileRecord) -> bool {
        self.pending.insert(record.path.clone(), record).is_none()
    }

    /// Take every pending record, leaving the set empty
    ///
    /// Records are returned sorted by path.
    pub fn drain(&mut self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = self.pending.drain().map(|(_, r)| r).collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.pending.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
