//! Flush loop
//!
//! One task per stream. Every tick it swaps the append buffer and enqueues
//! the snapshot; on the stop signal it performs a final forced swap, sends
//! the terminal snapshot and exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::buffer::AppendBuffer;
use super::queue::DrainSender;

/// Run the flush loop until `stop` is cancelled
pub async fn run_flush_loop(
    stream: Arc<str>,
    buffer: Arc<AppendBuffer>,
    queue: DrainSender,
    flush_interval: Duration,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now() + flush_interval,
        flush_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                let Some(snapshot) = buffer.swap(false) else {
                    continue;
                };
                if queue.send(snapshot).await.is_err() {
                    tracing::error!(stream = %stream, "writer gone, flush loop exiting");
                    return;
                }
            }
        }
    }

    match buffer.swap(true) {
        Some(snapshot) => {
            let bytes = snapshot.len();
            if queue.send(snapshot).await.is_err() {
                tracing::error!(stream = %stream, bytes, "writer gone before final flush");
            } else {
                tracing::debug!(stream = %stream, bytes, "final flush enqueued");
            }
        }
        None => tracing::debug!(stream = %stream, "buffer already sealed"),
    }
}
