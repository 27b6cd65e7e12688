//! Recycled accumulators for append buffers
//!
//! Every flush tick installs a fresh accumulator in the append buffer. The
//! writer hands drained snapshot buffers back here once they are on disk,
//! so a steady stream of ticks reuses the same few allocations.
//!
//! ```text
//! [AppendBuffer::swap] --get--> [BufferPool] <--put-- [StreamWriter]
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;

/// Lock-free pool of reusable `BytesMut` accumulators
pub struct BufferPool {
    /// Idle buffers
    queue: ArrayQueue<BytesMut>,

    /// Capacity of freshly allocated buffers
    buffer_capacity: usize,

    /// Buffers handed out from the pool
    reused: AtomicU64,

    /// Buffers allocated because the pool was empty
    allocated: AtomicU64,
}

impl BufferPool {
    /// Create a pool holding up to `pool_size` idle buffers
    ///
    /// The pool starts empty; buffers enter it as the writer returns them.
    pub fn new(pool_size: usize, buffer_capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(pool_size.max(1)),
            buffer_capacity,
            reused: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Take an empty buffer, allocating one if none is idle
    #[inline]
    pub fn get(&self) -> BytesMut {
        match self.queue.pop() {
            Some(buf) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                BytesMut::with_capacity(self.buffer_capacity)
            }
        }
    }

    /// Return a buffer after its contents were written
    ///
    /// Buffers that grew past 64x the default capacity during a burst are
    /// dropped instead of pinning that memory for the stream's lifetime.
    #[inline]
    pub fn put(&self, mut buf: BytesMut) {
        if buf.capacity() > self.buffer_capacity.saturating_mul(64) {
            return;
        }
        buf.clear();
        let _ = self.queue.push(buf);
    }

    /// Number of idle buffers
    #[inline]
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    /// Capacity of freshly allocated buffers
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// (reused, allocated) counters
    pub fn counts(&self) -> (u64, u64) {
        (
            self.reused.load(Ordering::Relaxed),
            self.allocated.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
#[path = "buffer_pool_test.rs"]
mod buffer_pool_test;
