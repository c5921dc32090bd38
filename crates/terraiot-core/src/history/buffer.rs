//! Bounded reading buffer
//!
//! Keeps a sliding window of the last `capacity` readings, oldest first.

use std::collections::VecDeque;

use super::Reading;
use crate::view::HistoryRange;

/// Default maximum number of readings kept in memory
pub const MAX_READINGS: usize = 100;

/// Bounded, chronologically ordered history of readings
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    /// Stored readings, oldest at the front
    readings: VecDeque<Reading>,
    /// Maximum number of readings
    capacity: usize,
}

impl ReadingHistory {
    /// Create an empty history holding up to [`MAX_READINGS`] readings
    pub fn new() -> Self {
        Self::with_capacity(MAX_READINGS)
    }

    /// Create an empty history with a custom capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // Reserve at most the default window; larger ones grow on demand
        Self {
            readings: VecDeque::with_capacity(capacity.min(MAX_READINGS)),
            capacity,
        }
    }

    /// Record a new reading stamped with the current time
    pub fn add(&mut self, voltage: f64, current: f64, resistance: f64) {
        self.push(Reading::new(voltage, current, resistance));
    }

    /// Append a reading, evicting the oldest entry when full
    pub fn push(&mut self, reading: Reading) {
        while self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    /// Snapshot of every stored reading, oldest first
    pub fn get_all(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }

    /// Snapshot of the last `count` readings, oldest first
    ///
    /// A `count` of zero yields an empty snapshot; use
    /// [`HistoryRange::All`] to request everything.
    pub fn get_recent(&self, count: usize) -> Vec<Reading> {
        let start = self.readings.len().saturating_sub(count);
        self.readings.range(start..).cloned().collect()
    }

    /// Snapshot of the readings covered by `range`
    pub fn select(&self, range: HistoryRange) -> Vec<Reading> {
        match range {
            HistoryRange::All => self.get_all(),
            HistoryRange::Recent(count) => self.get_recent(count),
        }
    }

    /// Remove all stored readings
    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Most recent reading
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Number of stored readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maximum number of readings kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voltages(readings: &[Reading]) -> Vec<f64> {
        readings.iter().map(Reading::voltage).collect()
    }

    #[test]
    fn test_history_basic() {
        let mut history = ReadingHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), MAX_READINGS);

        history.add(5.0, 1.0, 5.0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(Reading::voltage), Some(5.0));
    }

    #[test]
    fn test_eviction_keeps_last_window() {
        let mut history = ReadingHistory::with_capacity(3);
        for v in 1..=5 {
            history.add(v as f64, 1.0, v as f64);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(voltages(&history.get_all()), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut history = ReadingHistory::with_capacity(0);
        history.add(1.0, 1.0, 1.0);
        history.add(2.0, 1.0, 2.0);

        assert_eq!(history.capacity(), 1);
        assert_eq!(voltages(&history.get_all()), vec![2.0]);
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut history = ReadingHistory::with_capacity(usize::MAX);
        history.add(1.0, 1.0, 1.0);

        assert_eq!(history.capacity(), usize::MAX);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_recent_zero_is_empty() {
        let mut history = ReadingHistory::new();
        history.add(1.0, 1.0, 1.0);

        assert!(history.get_recent(0).is_empty());
        assert_eq!(history.select(HistoryRange::All).len(), 1);
    }
}
