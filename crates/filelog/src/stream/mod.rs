//! Buffered file streams
//!
//! One stream per active log file. Callers append into an in-memory buffer;
//! two background tasks move the data to disk:
//!
//! ```text
//! append() → [AppendBuffer] --tick--> [flush loop] → [drain queue] → [writer] → file
//!                                                                     ↓
//!                                                          [rotator] → [archiver]
//! ```
//!
//! - **buffer**: lock-protected accumulator, swapped out on every tick
//! - **queue**: bounded FIFO, blocks the flush loop (never callers) when full
//! - **flush**: timer task producing snapshots, final forced flush on stop
//! - **policy**: split-by-size / archive-by-hour decision
//! - **rotator**: renames and reopens the active file
//! - **archiver**: moves finished hours into the history directory
//! - **writer**: single owner of the file handle
//!
//! Tasks are not spawned on creation; call [`FileStream::start`].

pub mod archiver;
pub mod buffer;
pub mod buffer_pool;
pub mod flush;
pub mod metrics;
pub mod naming;
pub mod policy;
pub mod queue;
pub mod rotator;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::StreamOptions;
use crate::diagnostics::RateLimitedLogger;
use crate::error::{FileLogError, Result, validate_name};

use buffer::AppendBuffer;
use buffer_pool::BufferPool;
use metrics::{MetricsSnapshot, StreamMetrics};
use queue::{DrainReceiver, DrainSender, drain_queue};
use rotator::FileRotator;
use writer::StreamWriter;

/// Handles of a started stream's background tasks
#[derive(Debug)]
pub struct StreamTasks {
    /// Flush loop
    pub flush: JoinHandle<()>,
    /// Writer; yields the final counters
    pub writer: JoinHandle<MetricsSnapshot>,
}

/// Parts moved into the background tasks by `start()`
struct Unstarted {
    writer: StreamWriter,
    sender: DrainSender,
    receiver: DrainReceiver,
    done: watch::Sender<bool>,
}

/// A buffered, rotating log file
pub struct FileStream {
    name: Arc<str>,
    path: PathBuf,
    buffer: Arc<AppendBuffer>,
    flush_interval: Duration,
    stop: CancellationToken,
    done: watch::Receiver<bool>,
    unstarted: Mutex<Option<Unstarted>>,
    metrics: Arc<StreamMetrics>,
    drops: RateLimitedLogger,
}

impl FileStream {
    /// Create the stream for `<dir>/<component>-<category>[-<qualifier>].log`
    ///
    /// Creates `dir` and `history_dir` if absent and opens the active file.
    /// Directory or file failures are returned here; once created, the
    /// stream never reports errors to callers.
    pub fn open(
        dir: &Path,
        component: &str,
        category: &str,
        qualifier: Option<&str>,
        history_dir: Option<&Path>,
        options: StreamOptions,
    ) -> Result<Self> {
        validate_name("component", component)?;
        validate_name("category", category)?;
        if let Some(q) = qualifier {
            validate_name("qualifier", q)?;
        }

        fs::create_dir_all(dir).map_err(|e| FileLogError::create_dir(dir, e))?;
        if let Some(history) = history_dir {
            fs::create_dir_all(history).map_err(|e| FileLogError::create_dir(history, e))?;
        }

        let name: Arc<str> = match qualifier {
            Some(q) => format!("{component}-{category}-{q}").into(),
            None => format!("{component}-{category}").into(),
        };
        let path = dir.join(naming::active_file_name(component, category, qualifier));

        let metrics = Arc::new(StreamMetrics::new());
        let rotator = FileRotator::open(
            Arc::clone(&name),
            path.clone(),
            history_dir.map(Path::to_path_buf),
            Local::now().naive_local(),
            Arc::clone(&metrics),
        )
        .map_err(|e| FileLogError::open_file(&path, e))?;

        let pool = Arc::new(BufferPool::new(options.pool_size, options.buffer_capacity));
        let buffer = Arc::new(AppendBuffer::new(Arc::clone(&pool)));
        let writer = StreamWriter::new(Arc::clone(&name), rotator, pool, Arc::clone(&metrics));
        let (sender, receiver) = drain_queue(options.queue_capacity);
        let (done_tx, done_rx) = watch::channel(false);

        tracing::debug!(stream = %name, path = %path.display(), "stream opened");

        Ok(Self {
            drops: RateLimitedLogger::for_stream(name.as_ref()),
            name,
            path,
            buffer,
            flush_interval: options.flush_interval,
            stop: CancellationToken::new(),
            done: done_rx,
            unstarted: Mutex::new(Some(Unstarted {
                writer,
                sender,
                receiver,
                done: done_tx,
            })),
            metrics,
        })
    }

    /// Spawn the flush loop and writer
    ///
    /// Outside a Tokio runtime this returns [`FileLogError::NoRuntime`] and
    /// the stream can still be started later. A stream starts once; later
    /// calls return [`FileLogError::AlreadyStarted`].
    pub fn start(&self) -> Result<StreamTasks> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(FileLogError::NoRuntime {
                stream: self.name.to_string(),
            });
        }
        let Some(parts) = self.unstarted.lock().take() else {
            return Err(FileLogError::AlreadyStarted {
                stream: self.name.to_string(),
            });
        };

        let writer = tokio::spawn(parts.writer.run(parts.receiver, parts.done));
        let flush = tokio::spawn(flush::run_flush_loop(
            Arc::clone(&self.name),
            Arc::clone(&self.buffer),
            parts.sender,
            self.flush_interval,
            self.stop.clone(),
        ));

        tracing::debug!(stream = %self.name, "stream started");
        Ok(StreamTasks { flush, writer })
    }

    /// Append text; never blocks on I/O and never fails
    ///
    /// Once the stop signal was given the text is dropped and a diagnostic
    /// is emitted.
    pub fn append(&self, text: &str) {
        if self.stop.is_cancelled() || !self.buffer.append(text) {
            self.metrics.record_dropped();
            self.drops.notice("append after shutdown dropped");
        }
    }

    /// Flush everything buffered, close the file and wait until durable
    ///
    /// Idempotent: later calls wait on the same completion and never flush
    /// again. A stream that was never started is started first so its
    /// buffered content is not lost. No timeout is applied.
    pub async fn shutdown(&self) {
        self.stop.cancel();
        if let Ok(tasks) = self.start() {
            // Detached; completion is observed through `done`
            drop(tasks);
        }

        let mut done = self.done.clone();
        if done.wait_for(|closed| *closed).await.is_err() {
            tracing::error!(stream = %self.name, "writer exited without signalling completion");
        }
    }

    /// Stream name, `<component>-<category>[-<qualifier>]`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the stop signal was given
    pub fn is_stopping(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Whether the writer finished and the file is closed
    pub fn is_closed(&self) -> bool {
        *self.done.borrow()
    }

    /// Bytes appended but not yet swapped out
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        // A running flush loop still performs its final flush
        self.stop.cancel();
    }
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("stopping", &self.is_stopping())
            .field("closed", &self.is_closed())
            .finish()
    }
}
