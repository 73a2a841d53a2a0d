//! File records sent to the indexing service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file's full contents at observation time
///
/// Records are never mutated: a newer observation of the same path
/// produces a new record that supersedes the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "file_path")]
    pub path: PathBuf,
    #[serde(rename = "file_extension")]
    pub extension: String,
    #[serde(rename = "data_chunks")]
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let extension = file_extension(&path);
        Self {
            path,
            extension,
            content: content.into(),
        }
    }
}

/// Extension of the final path component, including the leading dot
///
/// The suffix starts at the last `.` of the file name, so `main.go` yields
/// `.go`, `.gitignore` yields `.gitignore` and `Makefile` yields an empty
/// string.
pub fn file_extension(path: &Path) -> String {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return String::new();
    };

    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}
