//! Per-stream counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between a stream handle and its writer task
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Snapshots written to disk
    pub snapshots_written: AtomicU64,

    /// Payload bytes written to disk
    pub bytes_written: AtomicU64,

    /// Write or sync failures (each retry counts)
    pub write_errors: AtomicU64,

    /// Size-triggered rotations
    pub splits: AtomicU64,

    /// Hour-triggered rotations
    pub hourly_rotations: AtomicU64,

    /// Files moved into the history directory
    pub files_archived: AtomicU64,

    /// Appends dropped because the stream had stopped
    pub dropped_appends: AtomicU64,
}

impl StreamMetrics {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            snapshots_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            splits: AtomicU64::new(0),
            hourly_rotations: AtomicU64::new(0),
            files_archived: AtomicU64::new(0),
            dropped_appends: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_write(&self, bytes: u64) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_split(&self) {
        self.splits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_hourly_rotation(&self) {
        self.hourly_rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_archived(&self, files: u64) {
        self.files_archived.fetch_add(files, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.dropped_appends.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            hourly_rotations: self.hourly_rotations.load(Ordering::Relaxed),
            files_archived: self.files_archived.load(Ordering::Relaxed),
            dropped_appends: self.dropped_appends.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of stream counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub snapshots_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub splits: u64,
    pub hourly_rotations: u64,
    pub files_archived: u64,
    pub dropped_appends: u64,
}
