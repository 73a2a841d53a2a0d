//! Watch session
//!
//! One task owns the pending change set, the debounce timer and the event
//! source. Events are handled one at a time in delivery order; flushes
//! drain on the same task and hand the batch to a spawned upload, so a slow
//! upload never holds up event handling.
//!
//! At most one upload is in flight. A flush that comes due while one is
//! running waits for it and then drains everything pending, so batches
//! reach the sink in order and a later batch always carries newer content.

use crate::aggregate::ChangeAggregator;
use crate::debounce::DebounceScheduler;
use crate::error::{Result, WatchError};
use crate::ignore::IgnoreRules;
use crate::scan::{read_record, scan};
use crate::source::{EventSource, FsEventSource, PathEvent};
use driftsync_core::{ContextId, SyncConfig, UploadError, UploadSink};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, trace, warn};
use walkdir::WalkDir;

type UploadOutcome = (usize, std::result::Result<ContextId, UploadError>);

/// Counters reported when a session ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Events delivered by the source
    pub events_seen: usize,
    /// Events that changed the pending set
    pub events_accepted: usize,
    /// Batches handed to the sink
    pub flushes: usize,
    /// Batches the sink rejected (dropped, not retried)
    pub failed_uploads: usize,
    /// Files in successfully uploaded batches
    pub files_uploaded: usize,
}

/// Watch-and-upload session for one root directory
pub struct WatchSession<S: UploadSink> {
    config: SyncConfig,
    rules: IgnoreRules,
    sink: Arc<S>,
}

impl<S: UploadSink> WatchSession<S> {
    /// Load ignore rules for `root` and prepare a session
    pub fn new(root: &Path, config: SyncConfig, sink: Arc<S>) -> Result<Self> {
        let rules = IgnoreRules::load(root, &config)?;
        Ok(Self {
            config,
            rules,
            sink,
        })
    }

    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Scan the root and upload the full snapshot (not incremental)
    ///
    /// Returns the number of files sent and the context id assigned by the
    /// sink.
    pub async fn initial_upload(&self) -> Result<(usize, ContextId)> {
        let files = scan(&self.rules, &self.config)?;
        let count = files.len();
        let context_id = self.sink.upload(files, false).await?;
        info!(files = count, context_id = %context_id, "initial upload complete");
        Ok((count, context_id))
    }

    /// Subscribe to the filesystem under the root
    pub fn start_source(&self) -> Result<FsEventSource> {
        FsEventSource::start(&self.rules, &self.config)
    }

    /// Consume events until `shutdown` resolves or the source fails
    ///
    /// On shutdown any pending changes are flushed and in-flight uploads
    /// are awaited. A closed or failing source ends the session with an
    /// error; in-flight uploads are abandoned.
    pub async fn run<E, F>(&self, mut source: E, shutdown: F) -> Result<SessionSummary>
    where
        E: EventSource,
        F: Future<Output = ()>,
    {
        let mut changes = ChangeAggregator::new();
        let mut debounce = DebounceScheduler::new(self.config.quiet_period);
        let mut uploads: JoinSet<UploadOutcome> = JoinSet::new();
        let mut summary = SessionSummary::default();
        let mut flush_due = false;

        tokio::pin!(shutdown);

        let outcome = loop {
            let deadline = debounce.deadline();

            tokio::select! {
                () = &mut shutdown => break Ok(()),

                event = source.next_event() => match event {
                    Some(Ok(event)) => {
                        summary.events_seen += 1;
                        if self.handle_event(&mut source, &mut changes, event) {
                            summary.events_accepted += 1;
                            debounce.on_event();
                        }
                    }
                    Some(Err(e)) => break Err(e),
                    None => break Err(WatchError::SourceClosed),
                },

                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debounce.poll_fire() {
                        if uploads.is_empty() {
                            self.flush(&mut changes, &mut uploads, &mut summary);
                        } else {
                            debug!(pending = changes.len(), "upload in flight, holding batch");
                            flush_due = true;
                        }
                    }
                }

                Some(joined) = uploads.join_next(), if !uploads.is_empty() => {
                    record_upload(joined, &mut summary);
                    if std::mem::take(&mut flush_due) {
                        self.flush(&mut changes, &mut uploads, &mut summary);
                    }
                }
            }
        };

        if let Err(e) = outcome {
            error!(
                pending = changes.len(),
                in_flight = uploads.len(),
                "watch session terminated: {e}"
            );
            return Err(e);
        }

        debounce.cancel();
        while let Some(joined) = uploads.join_next().await {
            record_upload(joined, &mut summary);
        }
        self.flush(&mut changes, &mut uploads, &mut summary);
        while let Some(joined) = uploads.join_next().await {
            record_upload(joined, &mut summary);
        }

        info!(
            events = summary.events_seen,
            flushes = summary.flushes,
            failed = summary.failed_uploads,
            "watch session stopped"
        );
        Ok(summary)
    }

    /// Apply one event to the pending set
    ///
    /// Returns true when at least one file was recorded.
    fn handle_event<E: EventSource>(
        &self,
        source: &mut E,
        changes: &mut ChangeAggregator,
        event: PathEvent,
    ) -> bool {
        if self.rules.matches(&event.path) {
            trace!(path = %event.path.display(), "ignored");
            return false;
        }

        if event.is_dir {
            return self.watch_new_dir(source, changes, &event.path);
        }

        // Symlinks, FIFOs, sockets and devices are never read
        if !event.is_file {
            trace!(path = %event.path.display(), "not a regular file");
            return false;
        }

        if !self.config.is_supported(&event.path) {
            return false;
        }

        debug!(path = %event.path.display(), kind = ?event.kind, "file changed");
        self.record_file(changes, &event.path)
    }

    /// Subscribe a newly seen directory and everything already inside it
    ///
    /// Entries created before the subscription existed produce no events,
    /// so eligible files found here are recorded directly.
    fn watch_new_dir<E: EventSource>(
        &self,
        source: &mut E,
        changes: &mut ChangeAggregator,
        dir: &Path,
    ) -> bool {
        match source.watch_dir(dir) {
            Ok(true) => info!(
                path = %dir.display(),
                watched = source.watched(),
                "new directory added to watch"
            ),
            Ok(false) => return false,
            Err(e) => {
                warn!(path = %dir.display(), "failed to watch new directory: {e}");
                return false;
            }
        }

        let mut recorded = false;
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .follow_root_links(false)
            .into_iter()
            .filter_entry(|e| !self.rules.matches(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir.display(), "failed to walk new directory: {e}");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if let Err(e) = source.watch_dir(entry.path()) {
                    warn!(path = %entry.path().display(), "failed to watch directory: {e}");
                }
            } else if entry.file_type().is_file() && self.config.is_supported(entry.path()) {
                recorded |= self.record_file(changes, entry.path());
            }
        }
        recorded
    }

    fn record_file(&self, changes: &mut ChangeAggregator, path: &Path) -> bool {
        match read_record(path, &self.config) {
            Ok(Some(record)) => {
                changes.record(record);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable file: {e}");
                false
            }
        }
    }

    fn flush(
        &self,
        changes: &mut ChangeAggregator,
        uploads: &mut JoinSet<UploadOutcome>,
        summary: &mut SessionSummary,
    ) {
        let batch = changes.drain();
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        summary.flushes += 1;
        info!(files = count, "uploading changed files");

        let sink = Arc::clone(&self.sink);
        uploads.spawn(async move { (count, sink.upload(batch, true).await) });
    }
}

fn record_upload(
    joined: std::result::Result<UploadOutcome, JoinError>,
    summary: &mut SessionSummary,
) {
    match joined {
        Ok((count, Ok(context_id))) => {
            summary.files_uploaded += count;
            debug!(files = count, context_id = %context_id, "incremental upload complete");
        }
        Ok((count, Err(e))) => {
            summary.failed_uploads += 1;
            error!(files = count, "incremental upload failed, batch dropped: {e}");
        }
        Err(e) => {
            summary.failed_uploads += 1;
            error!("upload task failed: {e}");
        }
    }
}
