//! Core types for Driftsync
//!
//! This crate provides the pieces shared by the watcher, the remote client
//! and the CLI:
//! - `FileRecord`, one file's full contents at observation time
//! - `SyncConfig`, the explicit configuration handed to every component
//! - `UploadSink` / `TokenProvider`, the seams to the remote indexing service

pub mod config;
pub mod record;
pub mod sink;

pub use config::{config_file_path, ConfigError, SyncConfig};
pub use record::{file_extension, FileRecord};
pub use sink::{ContextId, TokenProvider, UploadError, UploadSink};

/// Result carrying a configuration error by default
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
