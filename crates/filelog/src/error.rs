//! File logger error types
//!
//! Only construction-time failures are errors. Once a stream is running,
//! I/O problems are reported through `tracing` and never reach callers.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file logger operations
pub type Result<T> = std::result::Result<T, FileLogError>;

/// Errors surfaced when creating or configuring log streams
#[derive(Debug, Error)]
pub enum FileLogError {
    /// A log or history directory could not be created
    #[error("failed to create directory '{}': {source}", path.display())]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The active log file could not be opened
    #[error("failed to open log file '{}': {source}", path.display())]
    OpenFile {
        /// Path of the active file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// `start()` was called on a stream that already runs
    #[error("stream '{stream}' is already started")]
    AlreadyStarted {
        /// Stream name
        stream: String,
    },

    /// Background tasks cannot be spawned outside a Tokio runtime
    #[error("stream '{stream}' must be started from within a Tokio runtime")]
    NoRuntime {
        /// Stream name
        stream: String,
    },

    /// A component, category or raw stream name cannot be used in a file name
    #[error("invalid {field} '{value}': must be non-empty and contain no path separators")]
    InvalidName {
        /// Which name was rejected
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// Failed to read a configuration file
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadConfig {
        /// Path to the file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML configuration
    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
}

impl FileLogError {
    /// Create a CreateDir error
    pub fn create_dir(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an OpenFile error
    pub fn open_file(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::OpenFile {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an InvalidName error
    pub fn invalid_name(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidName {
            field,
            value: value.into(),
        }
    }
}

/// Check that a name can be embedded in a file name
pub(crate) fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(FileLogError::invalid_name(field, value));
    }
    Ok(())
}
