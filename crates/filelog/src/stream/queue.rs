//! Drain queue between the flush loop and the writer
//!
//! A bounded FIFO. When full, the flush loop waits for room rather than
//! dropping a snapshot; callers of `append` never touch the queue.

use tokio::sync::mpsc;

use super::buffer::Snapshot;

/// Create a drain queue with the given capacity
pub fn drain_queue(capacity: usize) -> (DrainSender, DrainReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (DrainSender { tx }, DrainReceiver { rx })
}

/// Producer half, owned by the flush loop
#[derive(Debug)]
pub struct DrainSender {
    tx: mpsc::Sender<Snapshot>,
}

impl DrainSender {
    /// Enqueue a snapshot, waiting while the queue is full
    ///
    /// Fails only when the writer has gone away; the snapshot is handed back.
    pub async fn send(&self, snapshot: Snapshot) -> Result<(), Snapshot> {
        self.tx.send(snapshot).await.map_err(|e| e.0)
    }

    /// Free slots right now
    pub fn remaining(&self) -> usize {
        self.tx.capacity()
    }
}

/// Consumer half, owned by the writer
#[derive(Debug)]
pub struct DrainReceiver {
    rx: mpsc::Receiver<Snapshot>,
}

impl DrainReceiver {
    /// Next snapshot in production order, or `None` once the flush loop is gone
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}
