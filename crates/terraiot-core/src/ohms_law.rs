//! Ohm's Law helpers
//!
//! Derived quantities computed by sample producers before a reading is stored.

/// Resistance in ohms from voltage and current (R = V / I)
///
/// Returns `0.0` when `current` is zero instead of dividing by zero.
pub fn resistance(voltage: f64, current: f64) -> f64 {
    if current != 0.0 {
        voltage / current
    } else {
        0.0
    }
}
