//! Simulation Mode - random electrical sample generator
//!
//! Produces voltage and current values uniformly distributed over fixed
//! ranges, with resistance derived by Ohm's law. Used when no live
//! measurement source is connected.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::ohms_law;
use crate::sampler::SampleSource;

/// Half-open value range `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound
    pub min: f64,
    /// Exclusive upper bound
    pub max: f64,
}

impl ValueRange {
    /// Create a new range
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies in the range
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Value ranges for generated samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRanges {
    /// Voltage range in volts
    pub voltage: ValueRange,
    /// Current range in amperes
    pub current: ValueRange,
}

impl Default for SampleRanges {
    fn default() -> Self {
        Self {
            voltage: ValueRange::new(1.0, 12.0),
            current: ValueRange::new(0.1, 2.0),
        }
    }
}

impl SampleRanges {
    /// Check that both ranges are finite and non-empty
    pub fn validate(&self) -> Result<(), String> {
        if !self.voltage.is_valid() {
            return Err(format!(
                "voltage range {}..{} is empty or not finite",
                self.voltage.min, self.voltage.max
            ));
        }
        if !self.current.is_valid() {
            return Err(format!(
                "current range {}..{} is empty or not finite",
                self.current.min, self.current.max
            ));
        }
        Ok(())
    }
}

/// One generated measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Voltage in volts
    pub voltage: f64,
    /// Current in amperes
    pub current: f64,
    /// Resistance in ohms
    pub resistance: f64,
}

impl Sample {
    /// Build a sample from voltage and current, deriving resistance
    pub fn from_measurement(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            resistance: ohms_law::resistance(voltage, current),
        }
    }
}

/// Random sample generator
pub struct Simulator {
    ranges: SampleRanges,
    rng: StdRng,
}

impl Simulator {
    /// Create a simulator seeded from system entropy
    pub fn new(ranges: SampleRanges) -> Result<Self, ConfigError> {
        Self::with_rng(ranges, StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn seeded(ranges: SampleRanges, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(ranges, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ranges: SampleRanges, rng: StdRng) -> Result<Self, ConfigError> {
        ranges.validate().map_err(ConfigError::Invalid)?;
        Ok(Self { ranges, rng })
    }

    /// Ranges in use
    pub fn ranges(&self) -> SampleRanges {
        self.ranges
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> Sample {
        let voltage = self
            .rng
            .gen_range(self.ranges.voltage.min..self.ranges.voltage.max);
        let current = self
            .rng
            .gen_range(self.ranges.current.min..self.ranges.current.max);
        Sample::from_measurement(voltage, current)
    }
}

impl SampleSource for Simulator {
    fn next_sample(&mut self) -> Option<Sample> {
        Some(self.generate())
    }
}
