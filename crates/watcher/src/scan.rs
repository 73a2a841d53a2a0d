//! Initial directory scan
//!
//! Walks the watched root once and collects every eligible file for the
//! first, non-incremental upload.

use crate::error::{Result, WatchError};
use crate::ignore::IgnoreRules;
use driftsync_core::{FileRecord, SyncConfig};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Leading bytes inspected for NUL when detecting binary content
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Collect records for all eligible files under the rules' root
///
/// Excluded directories are not descended into. Symlinks and other
/// non-regular files are skipped. Any unreadable file aborts the scan.
pub fn scan(rules: &IgnoreRules, config: &SyncConfig) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(rules.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !rules.matches(e.path()))
    {
        let entry = entry?;

        if !entry.file_type().is_file() || !config.is_supported(entry.path()) {
            continue;
        }

        match read_record(entry.path(), config)? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    info!(
        root = %rules.root().display(),
        files = records.len(),
        skipped,
        "initial scan complete"
    );
    Ok(records)
}

/// Read a file into a record
///
/// Returns `Ok(None)` for anything that is not a regular file (symlinks,
/// FIFOs, sockets, devices), for files over the configured size cap or,
/// when binary skipping is on, files with NUL in their leading bytes.
pub fn read_record(path: &Path, config: &SyncConfig) -> Result<Option<FileRecord>> {
    // Opening a FIFO blocks until a writer appears
    let metadata = std::fs::symlink_metadata(path).map_err(|e| WatchError::io(path, e))?;
    if !metadata.file_type().is_file() {
        debug!(path = %path.display(), "skipping non-regular file");
        return Ok(None);
    }

    let mut file = std::fs::File::open(path).map_err(|e| WatchError::io(path, e))?;

    if let Some(limit) = config.max_file_bytes {
        let len = metadata.len();
        if len > limit {
            debug!(path = %path.display(), len, limit, "skipping oversized file");
            return Ok(None);
        }
    }

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| WatchError::io(path, e))?;

    if config.skip_binary && bytes.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0) {
        debug!(path = %path.display(), "skipping binary file");
        return Ok(None);
    }

    let content = String::from_utf8_lossy(&bytes).into_owned();
    Ok(Some(FileRecord::new(path, content)))
}
