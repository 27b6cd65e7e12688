//! Archiver
//!
//! Moves the files a finished hour left behind into
//! `<history_dir>/<YYYY-MM-DD>/`. Runs on the blocking pool so the writer
//! keeps draining while files are moved.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use super::metrics::StreamMetrics;
use super::naming::{archive_dir, rotated_candidates};
use super::policy::HourBucket;

/// Move every rotated file of `hour` into the history directory
///
/// Missing candidates are skipped and existing destinations overwritten.
/// Returns the number of files moved; only a failure to create the date
/// directory is an error, per-file failures are logged and skipped.
pub fn archive_hour(history_dir: &Path, active: &Path, hour: HourBucket) -> io::Result<u64> {
    let target_dir = archive_dir(history_dir, hour);
    fs::create_dir_all(&target_dir)?;

    let mut moved = 0;
    for candidate in rotated_candidates(active, hour) {
        let Some(name) = candidate.file_name() else {
            continue;
        };
        if !candidate.exists() {
            continue;
        }
        let destination = target_dir.join(name);
        match move_file(&candidate, &destination) {
            Ok(()) => moved += 1,
            Err(e) => tracing::error!(
                from = %candidate.display(),
                to = %destination.display(),
                error = %e,
                "failed to archive rotated file"
            ),
        }
    }
    Ok(moved)
}

/// Rename, replacing the destination; copies when crossing file systems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::remove_file(to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        other => other,
    }
}

/// Schedules hourly archives for one stream and tracks them until done
pub struct Archiver {
    stream: Arc<str>,
    history_dir: PathBuf,
    metrics: Arc<StreamMetrics>,
    tasks: JoinSet<()>,
}

impl Archiver {
    /// Create an archiver for a stream
    pub fn new(stream: Arc<str>, history_dir: PathBuf, metrics: Arc<StreamMetrics>) -> Self {
        Self {
            stream,
            history_dir,
            metrics,
            tasks: JoinSet::new(),
        }
    }

    /// Archive `hour` in the background
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, active: PathBuf, hour: HourBucket) {
        self.reap();

        let stream = Arc::clone(&self.stream);
        let history_dir = self.history_dir.clone();
        let metrics = Arc::clone(&self.metrics);
        self.tasks.spawn_blocking(move || {
            match archive_hour(&history_dir, &active, hour) {
                Ok(moved) => {
                    metrics.record_archived(moved);
                    tracing::info!(stream = %stream, hour = %hour, files = moved, "hour archived");
                }
                Err(e) => tracing::error!(
                    stream = %stream,
                    hour = %hour,
                    dir = %history_dir.display(),
                    error = %e,
                    "failed to create archive directory"
                ),
            }
        });
    }

    /// Archives still running
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every scheduled archive to finish
    pub async fn wait(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(stream = %self.stream, error = %e, "archive task failed");
            }
        }
    }

    /// Drop bookkeeping for finished archives
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                tracing::error!(stream = %self.stream, error = %e, "archive task failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "archiver_test.rs"]
mod archiver_test;
