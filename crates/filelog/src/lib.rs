//! Tell FileLog - Buffered, hourly-rotating file logger
//!
//! Producers append text without waiting on disk I/O. Each stream batches
//! appends in memory, hands a snapshot to a dedicated writer once per
//! second and keeps the active file bounded:
//!
//! - a new hour moves the finished file to `<history>/<YYYY-MM-DD>/`
//! - a file larger than [`MAX_FILE_SIZE`] is split into numbered siblings
//!
//! # Example
//!
//! ```ignore
//! use tell_filelog::{FileLogConfig, Registry};
//!
//! let registry = Registry::new(FileLogConfig::default());
//! let logger = registry.file_logger("gateway", "access", None)?;
//! logger.trace("listening");
//!
//! registry.shutdown_all().await;
//! ```
//!
//! Files are laid out as:
//!
//! ```text
//! logs/now/gateway-access-trace.log                      # active
//! logs/now/gateway-access-trace.log.2026101710.0         # split within the hour
//! logs/history/2026-10-17/gateway-access-trace.log.2026101709
//! ```

use std::time::Duration;

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod registry;
pub mod stream;

pub use config::{FileLogConfig, StreamOptions};
pub use error::{FileLogError, Result};
pub use level::Level;
pub use logger::{FileLogger, Logger, StdoutLogger};
pub use registry::Registry;
pub use stream::metrics::MetricsSnapshot;
pub use stream::{FileStream, StreamTasks};

/// Active file size that triggers a split (2 GiB)
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Number of distinct sequence suffixes before names are reused
pub const MAX_SEQUENCE_FILES: u32 = 10;

/// Period of the flush loop
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Initial capacity of an append buffer (2 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 2 * 1024;

/// Snapshots that may wait for the writer before the flush loop blocks
pub const DRAIN_QUEUE_CAPACITY: usize = 50_000;
