//! Shared history handle
//!
//! Producers and consumers each hold a clone of the same handle. Every
//! operation takes the lock once, so it is atomic with respect to the others.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Reading, ReadingHistory};
use crate::view::HistoryRange;

/// Cloneable, thread-safe handle to a [`ReadingHistory`]
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<Mutex<ReadingHistory>>,
}

impl SharedHistory {
    /// Create a shared history holding up to `capacity` readings
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_history(ReadingHistory::with_capacity(capacity))
    }

    /// Wrap an existing history
    pub fn from_history(history: ReadingHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    // A panicking holder cannot leave the deque half-updated, so a poisoned
    // lock still guards a valid history.
    fn lock(&self) -> MutexGuard<'_, ReadingHistory> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new reading stamped with the current time
    pub fn add(&self, voltage: f64, current: f64, resistance: f64) {
        self.lock().add(voltage, current, resistance);
    }

    /// Append a pre-built reading
    pub fn push(&self, reading: Reading) {
        self.lock().push(reading);
    }

    /// Snapshot of every stored reading, oldest first
    pub fn get_all(&self) -> Vec<Reading> {
        self.lock().get_all()
    }

    /// Snapshot of the last `count` readings, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<Reading> {
        self.lock().get_recent(count)
    }

    /// Snapshot of the readings covered by `range`
    pub fn select(&self, range: HistoryRange) -> Vec<Reading> {
        self.lock().select(range)
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<Reading> {
        self.lock().latest().cloned()
    }

    /// Remove all stored readings
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored readings
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of readings kept
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_state() {
        let history = SharedHistory::with_capacity(10);
        let producer = history.clone();

        producer.add(3.0, 1.5, 2.0);
        assert_eq!(history.len(), 1);

        history.clear();
        assert!(producer.is_empty());
    }

    #[test]
    fn test_concurrent_producers_respect_capacity() {
        let history = SharedHistory::with_capacity(50);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = history.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        history.add((t * 100 + i) as f64, 1.0, 1.0);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.len(), 50);
    }
}
