//! Append buffer and snapshots
//!
//! Callers append formatted text into an in-memory accumulator. The flush
//! loop periodically swaps the accumulator out under the same lock, so every
//! appended byte ends up in exactly one snapshot.

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::Mutex;

use super::buffer_pool::BufferPool;

/// Captured buffer contents handed from the flush loop to the writer
///
/// A terminal snapshot is the last one a stream ever produces; the writer
/// closes the file after writing it.
pub struct Snapshot {
    payload: BytesMut,
    terminal: bool,
}

impl Snapshot {
    /// Bytes to write
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether this is the final flush of the stream
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty (only possible for terminal snapshots)
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub(crate) fn into_payload(self) -> BytesMut {
        self.payload
    }

    #[cfg(test)]
    pub(crate) fn for_test(payload: &[u8], terminal: bool) -> Self {
        Self {
            payload: BytesMut::from(payload),
            terminal,
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.payload.len())
            .field("terminal", &self.terminal)
            .finish()
    }
}

struct BufferState {
    content: BytesMut,
    /// Set by the forced swap; later appends are refused
    sealed: bool,
}

/// Thread-safe accumulator that callers append into
pub struct AppendBuffer {
    state: Mutex<BufferState>,
    pool: Arc<BufferPool>,
}

impl AppendBuffer {
    /// Create a buffer drawing fresh accumulators from `pool`
    pub fn new(pool: Arc<BufferPool>) -> Self {
        let content = pool.get();
        Self {
            state: Mutex::new(BufferState {
                content,
                sealed: false,
            }),
            pool,
        }
    }

    /// Append text
    ///
    /// Never blocks on I/O. Returns false if the buffer was already sealed
    /// by the final flush, in which case the text is dropped.
    pub fn append(&self, text: &str) -> bool {
        let mut state = self.state.lock();
        if state.sealed {
            return false;
        }
        state.content.extend_from_slice(text.as_bytes());
        true
    }

    /// Capture the current contents and install an empty accumulator
    ///
    /// Returns nothing when the buffer is empty, unless `force_flush` is set.
    /// A forced swap produces a terminal snapshot (possibly empty) and seals
    /// the buffer; once sealed, every swap returns `None`.
    pub fn swap(&self, force_flush: bool) -> Option<Snapshot> {
        let mut state = self.state.lock();
        if state.sealed || (state.content.is_empty() && !force_flush) {
            return None;
        }

        let fresh = if force_flush {
            BytesMut::new()
        } else {
            self.pool.get()
        };
        let payload = std::mem::replace(&mut state.content, fresh);
        state.sealed = force_flush;

        Some(Snapshot {
            payload,
            terminal: force_flush,
        })
    }

    /// Bytes currently buffered
    pub fn len(&self) -> usize {
        self.state.lock().content.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the final flush already happened
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;
