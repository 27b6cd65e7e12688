//! Out-of-band diagnostics for the write pipeline
//!
//! Stream failures are never written into the log files themselves; they go
//! to `tracing`. A disk that keeps failing would otherwise produce one event
//! per snapshot, so repeated reports are rate limited: at most one event per
//! interval, carrying the number of suppressed reports since the last one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between diagnostics of the same kind
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Rate-limited reporter bound to one stream
pub struct RateLimitedLogger {
    /// Stream name attached to every event
    stream: String,

    /// Minimum interval between emitted events
    min_interval: Duration,

    /// Last time an event was emitted
    last_log_time: Mutex<Option<Instant>>,

    /// Reports since the last emitted event
    pending: AtomicU64,

    /// Reports ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a reporter with a custom interval
    pub fn new(stream: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            stream: stream.into(),
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Create a reporter with the default interval
    pub fn for_stream(stream: impl Into<String>) -> Self {
        Self::new(stream, DEFAULT_LOG_INTERVAL)
    }

    /// Record a failure; returns true if an event was emitted
    pub fn error(&self, message: &str, error: &dyn std::fmt::Display) -> bool {
        let Some(suppressed) = self.record() else {
            return false;
        };
        tracing::error!(
            stream = %self.stream,
            error = %error,
            suppressed,
            total = self.total_count(),
            "{message}"
        );
        true
    }

    /// Record a non-error notice (e.g. a dropped append); returns true if emitted
    pub fn notice(&self, message: &str) -> bool {
        let Some(suppressed) = self.record() else {
            return false;
        };
        tracing::warn!(
            stream = %self.stream,
            suppressed,
            total = self.total_count(),
            "{message}"
        );
        true
    }

    /// Count a report and decide whether to emit it
    ///
    /// Returns the number of reports suppressed since the previous event.
    fn record(&self) -> Option<u64> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        let mut last = self.last_log_time.lock();
        let now = Instant::now();
        let due = match *last {
            None => true,
            Some(at) => now.duration_since(at) >= self.min_interval,
        };
        if !due {
            return None;
        }
        *last = Some(now);
        drop(last);

        let count = self.pending.swap(0, Ordering::Relaxed);
        Some(count.saturating_sub(1))
    }

    /// Reports recorded since the last emitted event
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Reports ever recorded
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}
