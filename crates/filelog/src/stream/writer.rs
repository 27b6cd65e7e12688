//! Writer (drain loop)
//!
//! The single consumer of a stream's drain queue and the only owner of its
//! active file. For every snapshot: evaluate rotation, write, sync. A
//! failed write is retried once; a second failure drops that snapshot.
//! After the terminal snapshot the file is closed and completion is
//! signalled.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;

use super::buffer::Snapshot;
use super::buffer_pool::BufferPool;
use super::metrics::{MetricsSnapshot, StreamMetrics};
use super::queue::DrainReceiver;
use super::rotator::FileRotator;
use crate::diagnostics::RateLimitedLogger;

/// Drain-side state of one stream
pub struct StreamWriter {
    stream: Arc<str>,
    rotator: FileRotator,
    pool: Arc<BufferPool>,
    metrics: Arc<StreamMetrics>,
    /// Retried writes and sync failures
    errors: RateLimitedLogger,
    /// Snapshots dropped after the retry; never shares a window with `errors`
    losses: RateLimitedLogger,
}

impl StreamWriter {
    /// Create a writer around an opened rotator
    pub fn new(
        stream: Arc<str>,
        rotator: FileRotator,
        pool: Arc<BufferPool>,
        metrics: Arc<StreamMetrics>,
    ) -> Self {
        Self {
            errors: RateLimitedLogger::for_stream(stream.as_ref()),
            losses: RateLimitedLogger::for_stream(stream.as_ref()),
            stream,
            rotator,
            pool,
            metrics,
        }
    }

    /// Handle one snapshot at wall-clock time `now`
    ///
    /// Returns true if the snapshot was terminal.
    pub fn process(&mut self, snapshot: Snapshot, now: NaiveDateTime) -> bool {
        self.rotator.rotate_if_needed(now);

        let terminal = snapshot.is_terminal();
        if !snapshot.is_empty() {
            self.write_with_retry(snapshot.payload());
        }
        if let Err(e) = self.rotator.sync() {
            self.metrics.record_error();
            self.errors.error("failed to sync active file", &e);
        }

        self.pool.put(snapshot.into_payload());
        terminal
    }

    fn write_with_retry(&mut self, payload: &[u8]) {
        if let Err(first) = self.rotator.write_all(payload) {
            self.metrics.record_error();
            self.errors.error("write failed, retrying", &first);

            if let Err(second) = self.rotator.write_all(payload) {
                self.metrics.record_error();
                self.losses.error("write failed after retry, snapshot lost", &second);
                return;
            }
        }
        self.metrics.record_write(payload.len() as u64);
    }

    /// Drain `queue` until the terminal snapshot, then close the file
    ///
    /// `done` is set to true once everything is durable and scheduled
    /// archives have finished.
    pub async fn run(mut self, mut queue: DrainReceiver, done: watch::Sender<bool>) -> MetricsSnapshot {
        tracing::debug!(stream = %self.stream, path = %self.rotator.path().display(), "writer started");

        loop {
            match queue.recv().await {
                Some(snapshot) => {
                    if self.process(snapshot, Local::now().naive_local()) {
                        break;
                    }
                }
                None => {
                    tracing::warn!(stream = %self.stream, "drain queue closed without final flush");
                    break;
                }
            }
        }

        self.rotator.close();
        self.rotator.wait_for_archives().await;

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            stream = %self.stream,
            snapshots = snapshot.snapshots_written,
            bytes = snapshot.bytes_written,
            errors = snapshot.write_errors,
            "stream closed"
        );

        done.send_replace(true);
        snapshot
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
