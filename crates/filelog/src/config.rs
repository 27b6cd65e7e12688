//! File logger configuration
//!
//! TOML-based, every field optional.
//!
//! ```toml
//! log_dir = "./logs/now"
//! history_dir = "./logs/history"
//! level = "trace"
//! ```
//!
//! An empty `log_dir` selects stdout output; an empty `history_dir`
//! disables archiving of rotated files.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FileLogError, Result};
use crate::level::Level;
use crate::{DEFAULT_BUFFER_SIZE, DRAIN_QUEUE_CAPACITY, FLUSH_INTERVAL};

/// Default directory for active log files
pub const DEFAULT_LOG_DIR: &str = "./logs/now";

/// Default directory for archived log files
pub const DEFAULT_HISTORY_DIR: &str = "./logs/history";

/// Logger configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileLogConfig {
    /// Directory holding active log files (empty = stdout)
    pub log_dir: PathBuf,

    /// Directory receiving archived hourly files (empty = no archiving)
    pub history_dir: PathBuf,

    /// Minimum level written
    pub level: Level,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            level: Level::Trace,
        }
    }
}

impl FileLogConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FileLogError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Configuration that writes to stdout instead of files
    pub fn stdout(level: Level) -> Self {
        Self {
            log_dir: PathBuf::new(),
            history_dir: PathBuf::new(),
            level,
        }
    }

    /// Set the active log directory
    #[must_use]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Set the history directory
    #[must_use]
    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    /// Disable archiving
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.history_dir = PathBuf::new();
        self
    }

    /// Set the minimum level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Whether records go to stdout rather than files
    pub fn is_stdout(&self) -> bool {
        self.log_dir.as_os_str().is_empty()
    }

    /// History directory, if archiving is enabled
    pub fn history(&self) -> Option<&Path> {
        if self.history_dir.as_os_str().is_empty() {
            None
        } else {
            Some(&self.history_dir)
        }
    }
}

impl FromStr for FileLogConfig {
    type Err = FileLogError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Per-stream pipeline tunables
///
/// Defaults match the on-disk format constants. Tests shorten the flush
/// interval; production code should keep the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Period of the flush loop
    pub flush_interval: Duration,

    /// Capacity of the drain queue between flush loop and writer
    pub queue_capacity: usize,

    /// Initial capacity of each append buffer
    pub buffer_capacity: usize,

    /// Number of recycled buffers kept per stream
    pub pool_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            flush_interval: FLUSH_INTERVAL,
            queue_capacity: DRAIN_QUEUE_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_SIZE,
            pool_size: 4,
        }
    }
}

impl StreamOptions {
    /// Override the flush interval
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }
}
