//! Loggers
//!
//! [`FileLogger`] fans level-gated records out to one stream per level.
//! [`StdoutLogger`] prints them instead. [`Logger`] is the closed choice
//! between the two, made once when the logger is obtained.

mod stdout;

pub use stdout::StdoutLogger;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::Local;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinSet;

use crate::config::StreamOptions;
use crate::diagnostics::RateLimitedLogger;
use crate::error::{Result, validate_name};
use crate::format::{RAW_TAG, format_line};
use crate::level::Level;
use crate::stream::{FileStream, StreamTasks};

/// Level-gated logger writing `<component>-<category>-<level>.log` files
///
/// A record at level L is appended to the file of every level from the
/// threshold up to L, so the debug file holds everything and the error
/// file only errors.
pub struct FileLogger {
    name: String,
    dir: PathBuf,
    component: String,
    category: String,
    suffix: String,
    history_dir: Option<PathBuf>,
    options: StreamOptions,
    level: AtomicU8,
    streams: [Arc<FileStream>; 4],
    raw: DashMap<String, Arc<FileStream>>,
    /// Set by `shutdown`; no raw stream is opened afterwards
    closed: AtomicBool,
    errors: RateLimitedLogger,
}

impl FileLogger {
    /// Open the four level streams under `dir`
    ///
    /// Streams are not running until [`FileLogger::start`] is called.
    pub fn open(
        dir: &Path,
        component: &str,
        category: &str,
        suffix: Option<&str>,
        history_dir: Option<&Path>,
        level: Level,
        options: StreamOptions,
    ) -> Result<Self> {
        let open_level = |l: Level| -> Result<Arc<FileStream>> {
            FileStream::open(
                dir,
                component,
                category,
                Some(l.as_str()),
                history_dir,
                options,
            )
            .map(Arc::new)
        };
        let streams = [
            open_level(Level::Debug)?,
            open_level(Level::Trace)?,
            open_level(Level::Warn)?,
            open_level(Level::Error)?,
        ];

        let name = format!("{component}-{category}");
        tracing::info!(logger = %name, dir = %dir.display(), %level, "file logger opened");

        Ok(Self {
            errors: RateLimitedLogger::for_stream(name.as_str()),
            name,
            dir: dir.to_path_buf(),
            component: component.to_string(),
            category: category.to_string(),
            suffix: suffix.unwrap_or_default().to_string(),
            history_dir: history_dir.map(Path::to_path_buf),
            options,
            level: AtomicU8::new(level as u8),
            streams,
            raw: DashMap::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Start the background tasks of every level stream
    ///
    /// Fails with [`FileLogError::NoRuntime`](crate::FileLogError::NoRuntime)
    /// outside a Tokio runtime.
    pub fn start(&self) -> Result<Vec<StreamTasks>> {
        self.streams.iter().map(|s| s.start()).collect()
    }

    /// `<component>-<category>`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current threshold
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the threshold; takes effect for the next record
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a record at `level` would be written
    pub fn enabled(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    /// Stream backing the file of `level`
    pub fn stream(&self, level: Level) -> &Arc<FileStream> {
        &self.streams[level.index()]
    }

    /// Write a record at `level`
    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        let threshold = self.level();
        if !threshold.enables(level) {
            return;
        }

        let caller = std::panic::Location::caller();
        let now = Local::now().naive_local();
        for file_level in &Level::ALL[threshold.index()..=level.index()] {
            let line = format_line(now, file_level.as_str(), caller, message, &self.suffix);
            self.streams[file_level.index()].append(&line);
        }
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Write an ungated record to `<component>-<category>-<name>.log`
    ///
    /// The stream is opened and started on first use. If it cannot be
    /// created, or the logger was shut down, the record is dropped and a
    /// diagnostic is emitted.
    #[track_caller]
    pub fn write_raw(&self, name: &str, message: &str) {
        let caller = std::panic::Location::caller();
        let Some(stream) = self.raw_stream(name) else {
            return;
        };
        let line = format_line(Local::now().naive_local(), RAW_TAG, caller, message, &self.suffix);
        stream.append(&line);
    }

    fn raw_stream(&self, name: &str) -> Option<Arc<FileStream>> {
        if self.is_closed() {
            self.errors.notice("raw record after shutdown dropped");
            return None;
        }
        if let Some(stream) = self.raw.get(name) {
            return Some(Arc::clone(&stream));
        }

        if let Err(e) = validate_name("raw stream", name) {
            self.errors.error("raw record dropped", &e);
            return None;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            self.errors
                .notice("raw record dropped: no Tokio runtime to run the stream on");
            return None;
        }

        match self.raw.entry(name.to_string()) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(_) if self.is_closed() => {
                // Shutdown began after the first check and may already have
                // listed this shard; a stream opened now would never close
                self.errors.notice("raw record after shutdown dropped");
                None
            }
            Entry::Vacant(entry) => {
                let opened = FileStream::open(
                    &self.dir,
                    &self.component,
                    &self.category,
                    Some(name),
                    self.history_dir.as_deref(),
                    self.options,
                )
                .and_then(|stream| {
                    stream.start()?;
                    Ok(Arc::new(stream))
                });
                match opened {
                    Ok(stream) => {
                        tracing::debug!(logger = %self.name, raw = %name, "raw stream opened");
                        Some(Arc::clone(entry.insert(stream).value()))
                    }
                    Err(e) => {
                        self.errors.error("raw record dropped", &e);
                        None
                    }
                }
            }
        }
    }

    /// Whether `shutdown` was called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Flush and close every stream, level and raw, concurrently
    ///
    /// Records written afterwards are dropped, including raw records for
    /// names that had no stream yet.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);

        let mut tasks = JoinSet::new();
        let raw = self.raw.iter().map(|entry| Arc::clone(entry.value()));
        for stream in self.streams.iter().cloned().chain(raw) {
            tasks.spawn(async move { stream.shutdown().await });
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(logger = %self.name, error = %e, "stream shutdown task failed");
            }
        }
        tracing::info!(logger = %self.name, "file logger closed");
    }
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("name", &self.name)
            .field("dir", &self.dir)
            .field("level", &self.level())
            .field("raw_streams", &self.raw.len())
            .finish()
    }
}

/// A logger writing either to files or to stdout
#[derive(Debug, Clone)]
pub enum Logger {
    File(Arc<FileLogger>),
    Stdout(StdoutLogger),
}

impl Logger {
    pub fn level(&self) -> Level {
        match self {
            Self::File(l) => l.level(),
            Self::Stdout(l) => l.level(),
        }
    }

    pub fn set_level(&self, level: Level) {
        match self {
            Self::File(l) => l.set_level(level),
            Self::Stdout(l) => l.set_level(level),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: &str) {
        match self {
            Self::File(l) => l.log(level, message),
            Self::Stdout(l) => l.log(level, message),
        }
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log(Level::Trace, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    #[track_caller]
    pub fn write_raw(&self, name: &str, message: &str) {
        match self {
            Self::File(l) => l.write_raw(name, message),
            Self::Stdout(l) => l.write_raw(name, message),
        }
    }

    /// Make everything written so far durable; no-op for stdout
    pub async fn shutdown(&self) {
        if let Self::File(l) = self {
            l.shutdown().await;
        }
    }
}
