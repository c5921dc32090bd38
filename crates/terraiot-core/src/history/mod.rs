//! Reading History
//!
//! Stores the most recent electrical readings in memory.

mod buffer;
mod shared;

pub use buffer::{ReadingHistory, MAX_READINGS};
pub use shared::SharedHistory;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ohms_law;

/// A single immutable electrical reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    voltage: f64,
    current: f64,
    resistance: f64,
    timestamp: DateTime<Local>,
}

impl Reading {
    /// Create a reading stamped with the current time
    pub fn new(voltage: f64, current: f64, resistance: f64) -> Self {
        Self::at(voltage, current, resistance, Local::now())
    }

    /// Create a reading with an explicit capture time
    pub fn at(voltage: f64, current: f64, resistance: f64, timestamp: DateTime<Local>) -> Self {
        Self {
            voltage,
            current,
            resistance,
            timestamp,
        }
    }

    /// Create a reading from voltage and current, deriving resistance
    pub fn from_measurement(voltage: f64, current: f64) -> Self {
        Self::new(voltage, current, ohms_law::resistance(voltage, current))
    }

    /// Voltage in volts
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    /// Current in amperes
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Resistance in ohms
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Capture time
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}
