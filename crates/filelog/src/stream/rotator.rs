//! File rotator
//!
//! Owns the active file of one stream and performs the file-system side of
//! rotation: close, rename to the rotated name, reopen, and hand the
//! finished hour to the archiver. Only the writer task holds a rotator, so
//! none of this needs a lock on the file.
//!
//! Rename and reopen failures are logged and swallowed: the writer goes on
//! writing to whatever handle is left.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::archiver::Archiver;
use super::metrics::StreamMetrics;
use super::naming::rotated_path;
use super::policy::{Evaluation, HourBucket, RotationDecision, evaluate};

/// Open (or create) a file for appending
pub fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Active file plus rotation state for one stream
pub struct FileRotator {
    stream: Arc<str>,
    path: PathBuf,
    file: Option<File>,
    hour: HourBucket,
    sequence: u32,
    archiver: Option<Archiver>,
    metrics: Arc<StreamMetrics>,
}

impl FileRotator {
    /// Open the active file at `path`
    ///
    /// `history_dir` enables archiving of finished hours. `now` sets the
    /// initial hour bucket.
    pub fn open(
        stream: Arc<str>,
        path: PathBuf,
        history_dir: Option<PathBuf>,
        now: NaiveDateTime,
        metrics: Arc<StreamMetrics>,
    ) -> io::Result<Self> {
        let file = open_append(&path)?;
        let archiver = history_dir
            .map(|dir| Archiver::new(Arc::clone(&stream), dir, Arc::clone(&metrics)));
        Ok(Self {
            stream,
            path,
            file: Some(file),
            hour: HourBucket::of(now),
            sequence: 0,
            archiver,
            metrics,
        })
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hour bucket the active file belongs to
    pub fn hour(&self) -> HourBucket {
        self.hour
    }

    /// Sequence counter for size-triggered rotations within the hour
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Whether a file handle is currently open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Evaluate the rotation policy and apply the result
    ///
    /// A missing active file is recreated; any other stat failure skips
    /// rotation for this cycle. Returns the decision that was applied.
    pub fn rotate_if_needed(&mut self, now: NaiveDateTime) -> RotationDecision {
        let evaluation = evaluate(HourBucket::of(now), self.hour, || {
            fs::metadata(&self.path).map(|m| m.len())
        });

        match evaluation {
            Evaluation::Decided(decision) => {
                self.apply(decision, now);
                decision
            }
            Evaluation::FileMissing => {
                tracing::warn!(
                    stream = %self.stream,
                    path = %self.path.display(),
                    "active file missing, recreating"
                );
                self.file = None;
                self.reopen();
                RotationDecision::NONE
            }
            Evaluation::StatFailed(e) => {
                tracing::error!(
                    stream = %self.stream,
                    path = %self.path.display(),
                    error = %e,
                    "failed to stat active file, skipping rotation"
                );
                RotationDecision::NONE
            }
        }
    }

    /// Perform the file operations for a decision
    pub fn apply(&mut self, decision: RotationDecision, now: NaiveDateTime) {
        if decision.split {
            self.split(decision.archive, now);
        } else if decision.archive {
            self.archive_on_hour(now);
        }
    }

    /// Size-triggered rotation to `<path>.<hour>.<seq>`
    ///
    /// With `hour_passed`, also closes out the hour: the sequence restarts
    /// and the finished hour is archived.
    pub fn split(&mut self, hour_passed: bool, now: NaiveDateTime) {
        self.file = None;
        let target = rotated_path(&self.path, self.hour, Some(self.sequence));
        self.replace_active(&target);
        self.reopen();
        self.sequence = self.sequence.wrapping_add(1);
        self.metrics.record_split();

        tracing::info!(
            stream = %self.stream,
            rotated = %target.display(),
            "active file split"
        );

        if hour_passed {
            self.finish_hour(now);
        }
    }

    /// Hour-triggered rotation
    ///
    /// The first rotation of an hour gets the unnumbered name; after size
    /// splits it takes the next sequence slot.
    pub fn archive_on_hour(&mut self, now: NaiveDateTime) {
        self.file = None;
        let sequence = (self.sequence != 0).then_some(self.sequence);
        let target = rotated_path(&self.path, self.hour, sequence);
        self.replace_active(&target);
        self.reopen();
        self.metrics.record_hourly_rotation();

        tracing::info!(
            stream = %self.stream,
            rotated = %target.display(),
            "hourly rotation"
        );

        self.finish_hour(now);
    }

    /// Write the whole payload to the active file
    pub fn write_all(&mut self, payload: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(payload),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no active log file handle",
            )),
        }
    }

    /// Force written data to stable storage
    pub fn sync(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.sync_all(),
            None => Ok(()),
        }
    }

    /// Close the active file
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Wait for scheduled archives to complete
    pub async fn wait_for_archives(&mut self) {
        if let Some(archiver) = self.archiver.as_mut() {
            archiver.wait().await;
        }
    }

    fn finish_hour(&mut self, now: NaiveDateTime) {
        self.sequence = 0;
        let finished = self.hour;
        if let Some(archiver) = self.archiver.as_mut() {
            archiver.schedule(self.path.clone(), finished);
        }
        self.hour = HourBucket::of(now);
    }

    /// Move the active file to `target`, replacing whatever is there
    fn replace_active(&self, target: &Path) {
        if target.exists()
            && let Err(e) = fs::remove_file(target)
        {
            tracing::error!(
                stream = %self.stream,
                path = %target.display(),
                error = %e,
                "failed to remove stale rotated file"
            );
        }
        if let Err(e) = fs::rename(&self.path, target) {
            tracing::error!(
                stream = %self.stream,
                from = %self.path.display(),
                to = %target.display(),
                error = %e,
                "failed to rename active file"
            );
        }
    }

    fn reopen(&mut self) {
        match open_append(&self.path) {
            Ok(file) => self.file = Some(file),
            Err(e) => tracing::error!(
                stream = %self.stream,
                path = %self.path.display(),
                error = %e,
                "failed to reopen active file"
            ),
        }
    }
}

#[cfg(test)]
#[path = "rotator_test.rs"]
mod rotator_test;
