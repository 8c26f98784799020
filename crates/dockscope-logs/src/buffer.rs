use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::LogEntry;

/// Thread-safe ring buffer for log entries.
///
/// A single writer appends while any number of readers take snapshots; the
/// lock is only ever held for the duration of a push or a copy.
#[derive(Clone)]
pub struct LogBuffer {
    /// Internal storage
    entries: Arc<RwLock<VecDeque<LogEntry>>>,

    /// Maximum capacity
    capacity: usize,
}

impl LogBuffer {
    /// Create a new log buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Push a new entry, evicting the oldest if at capacity
    pub fn push(&self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Copy of all entries, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.read().iter().cloned().collect()
    }

    /// Total entry count
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(i: usize) -> LogEntry {
        LogEntry::new("abc", Utc::now(), format!("line {i}"))
    }

    #[test]
    fn test_keeps_last_entries_in_order() {
        let buffer = LogBuffer::new(50);
        for i in 0..120 {
            buffer.push(entry(i));
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 50);
        for (offset, e) in snapshot.iter().enumerate() {
            assert_eq!(e.message, format!("line {}", 70 + offset));
        }
    }

    #[test]
    fn test_snapshot_is_detached() {
        let buffer = LogBuffer::new(3);
        buffer.push(entry(1));

        let mut first = buffer.snapshot();
        buffer.push(entry(2));
        let second = buffer.snapshot();

        first[0].message = "mutated".to_string();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].message, "line 1");
        assert_eq!(buffer.snapshot()[0].message, "line 1");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let buffer = LogBuffer::new(0);
        buffer.push(entry(1));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_concurrent_readers_never_see_overflow() {
        let buffer = LogBuffer::new(50);
        let writer = {
            let buffer = buffer.clone();
            std::thread::spawn(move || {
                for i in 0..5_000 {
                    buffer.push(entry(i));
                }
            })
        };

        for _ in 0..1_000 {
            assert!(buffer.snapshot().len() <= 50);
        }
        writer.join().unwrap();
        assert_eq!(buffer.len(), 50);
    }
}
