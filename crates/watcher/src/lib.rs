//! Directory watching for Driftsync
//!
//! This crate provides the watch-and-debounce pipeline:
//! - Ignore rules (built-ins plus the project `.gitignore`)
//! - One-shot directory scan for the initial upload
//! - Deduplicated aggregation of changed files
//! - A single-slot debounce timer that coalesces bursts into one upload
//! - A `notify` backed event source that grows its watch set as
//!   directories appear
//!
//! ```text
//! FsEventSource ──► ignore/extension filter ──► ChangeAggregator
//!                                                   │
//!                  DebounceScheduler ── quiet ──► drain ──► UploadSink
//! ```

pub mod aggregate;
pub mod debounce;
pub mod error;
pub mod ignore;
pub mod scan;
pub mod session;
pub mod source;

pub use aggregate::ChangeAggregator;
pub use debounce::{Clock, DebounceScheduler, ManualClock, TokioClock};
pub use error::{Result, WatchError};
pub use ignore::IgnoreRules;
pub use scan::{read_record, scan};
pub use session::{SessionSummary, WatchSession};
pub use source::{ChangeKind, EventSource, FsEventSource, PathEvent};
