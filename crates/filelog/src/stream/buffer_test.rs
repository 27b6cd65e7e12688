//! Tests for the append buffer

use super::*;
use std::thread;

fn buffer() -> AppendBuffer {
    AppendBuffer::new(Arc::new(BufferPool::new(4, 2048)))
}

#[test]
fn test_swap_empty_returns_none() {
    let buf = buffer();
    assert!(buf.swap(false).is_none());
    assert!(!buf.is_sealed());
}

#[test]
fn test_swap_captures_and_resets() {
    let buf = buffer();
    assert!(buf.append("hello"));
    assert!(buf.append("world"));

    let snapshot = buf.swap(false).expect("snapshot");
    assert_eq!(snapshot.payload(), b"helloworld");
    assert!(!snapshot.is_terminal());
    assert!(buf.is_empty());
    assert!(buf.swap(false).is_none());
}

#[test]
fn test_forced_swap_on_empty_buffer_emits_terminal() {
    let buf = buffer();
    let snapshot = buf.swap(true).expect("forced snapshot");
    assert!(snapshot.is_terminal());
    assert!(snapshot.is_empty());
    assert!(buf.is_sealed());
}

#[test]
fn test_forced_swap_carries_pending_content() {
    let buf = buffer();
    buf.append("x");
    let snapshot = buf.swap(true).expect("forced snapshot");
    assert_eq!(snapshot.payload(), b"x");
    assert!(snapshot.is_terminal());
}

#[test]
fn test_append_after_seal_is_dropped() {
    let buf = buffer();
    buf.swap(true);
    assert!(!buf.append("late"));
    assert!(buf.is_empty());
    assert!(buf.swap(true).is_none());
    assert!(buf.swap(false).is_none());
}

#[test]
fn test_concurrent_appends_neither_lost_nor_duplicated() {
    let buf = Arc::new(buffer());
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let buf = Arc::clone(&buf);
            thread::spawn(move || {
                for i in 0..500 {
                    buf.append(&format!("{t}:{i}\n"));
                }
            })
        })
        .collect();

    let mut collected = Vec::new();
    while writers.iter().any(|w| !w.is_finished()) {
        if let Some(snapshot) = buf.swap(false) {
            collected.extend_from_slice(snapshot.payload());
        }
    }
    for w in writers {
        w.join().unwrap();
    }
    if let Some(snapshot) = buf.swap(true) {
        collected.extend_from_slice(snapshot.payload());
    }

    let text = String::from_utf8(collected).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2000);

    // Per-thread order is preserved
    for t in 0..4 {
        let prefix = format!("{t}:");
        let seq: Vec<usize> = lines
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix))
            .map(|n| n.parse().unwrap())
            .collect();
        assert_eq!(seq, (0..500).collect::<Vec<_>>());
    }
}
