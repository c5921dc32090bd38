//! Trend views
//!
//! Range selection over the history plus the projections chart and table
//! consumers render from a snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::export::TIMESTAMP_FORMAT;
use crate::history::Reading;

/// Time-axis label format for chart points
pub const AXIS_LABEL_FORMAT: &str = "%H:%M:%S";

/// Which part of the history a view covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRange {
    /// The last `n` readings (`Recent(0)` selects nothing)
    Recent(usize),
    /// Every stored reading
    All,
}

impl HistoryRange {
    /// Last 10 readings
    pub const LAST_10: Self = HistoryRange::Recent(10);
    /// Last 25 readings
    pub const LAST_25: Self = HistoryRange::Recent(25);

    /// Translate an integer count where zero or negative means "all"
    pub fn from_count(count: i64) -> Self {
        if count <= 0 {
            HistoryRange::All
        } else {
            HistoryRange::Recent(usize::try_from(count).unwrap_or(usize::MAX))
        }
    }

    /// Range presets offered by the trend explorer
    pub fn presets() -> [HistoryRange; 3] {
        [Self::LAST_10, Self::LAST_25, HistoryRange::All]
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self::LAST_10
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryRange::Recent(count) => write!(f, "last {}", count),
            HistoryRange::All => write!(f, "all"),
        }
    }
}

/// Error returned when a range string is neither `all` nor a positive count
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid range '{0}': expected 'all' or a positive count")]
pub struct ParseRangeError(String);

impl FromStr for HistoryRange {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(HistoryRange::All);
        }
        match trimmed.parse::<usize>() {
            Ok(count) if count > 0 => Ok(HistoryRange::Recent(count)),
            _ => Err(ParseRangeError(s.to_string())),
        }
    }
}

/// A named series of (index, value) points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Legend label including the unit
    pub label: &'static str,
    /// Points keyed by position in the snapshot
    pub points: Vec<(f64, f64)>,
}

impl Series {
    fn from_readings(label: &'static str, readings: &[Reading], value: fn(&Reading) -> f64) -> Self {
        Self {
            label,
            points: readings
                .iter()
                .enumerate()
                .map(|(i, r)| (i as f64, value(r)))
                .collect(),
        }
    }
}

/// Chart data for a snapshot: one series per quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    /// Capture time of each point, shared by all three series
    pub labels: Vec<String>,
    /// Voltage (V)
    pub voltage: Series,
    /// Current (A)
    pub current: Series,
    /// Resistance (Ω)
    pub resistance: Series,
}

impl TrendSeries {
    /// Build the three chart series from a snapshot
    pub fn from_readings(readings: &[Reading]) -> Self {
        Self {
            labels: readings
                .iter()
                .map(|r| r.timestamp().format(AXIS_LABEL_FORMAT).to_string())
                .collect(),
            voltage: Series::from_readings("Voltage (V)", readings, Reading::voltage),
            current: Series::from_readings("Current (A)", readings, Reading::current),
            resistance: Series::from_readings("Resistance (Ω)", readings, Reading::resistance),
        }
    }

    /// True when the snapshot had no readings
    pub fn is_empty(&self) -> bool {
        self.voltage.points.is_empty()
    }
}

/// A formatted table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Capture time
    pub timestamp: String,
    /// Voltage with unit
    pub voltage: String,
    /// Current with unit
    pub current: String,
    /// Resistance with unit
    pub resistance: String,
}

impl TableRow {
    /// Format a reading for tabular display
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp().format(TIMESTAMP_FORMAT).to_string(),
            voltage: format!("{:.2} V", reading.voltage()),
            current: format!("{:.2} A", reading.current()),
            resistance: format!("{:.2} Ω", reading.resistance()),
        }
    }

    /// Format a whole snapshot
    pub fn rows(readings: &[Reading]) -> Vec<Self> {
        readings.iter().map(Self::from_reading).collect()
    }
}

/// Dashboard value with at most two fractional digits and no trailing zeros
pub fn format_gauge(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_from_count() {
        assert_eq!(HistoryRange::from_count(0), HistoryRange::All);
        assert_eq!(HistoryRange::from_count(-3), HistoryRange::All);
        assert_eq!(HistoryRange::from_count(25), HistoryRange::LAST_25);
        assert!(matches!(
            HistoryRange::from_count(i64::MAX),
            HistoryRange::Recent(n) if n > 0
        ));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!("all".parse::<HistoryRange>(), Ok(HistoryRange::All));
        assert_eq!("ALL".parse::<HistoryRange>(), Ok(HistoryRange::All));
        assert_eq!("10".parse::<HistoryRange>(), Ok(HistoryRange::LAST_10));
        assert!("0".parse::<HistoryRange>().is_err());
        assert!("-5".parse::<HistoryRange>().is_err());
        assert!("ten".parse::<HistoryRange>().is_err());
    }

    #[test]
    fn test_default_range() {
        assert_eq!(HistoryRange::default(), HistoryRange::Recent(10));
        assert_eq!(HistoryRange::default().to_string(), "last 10");
    }

    #[test]
    fn test_trend_series_indices() {
        let readings = vec![
            Reading::new(1.0, 0.5, 2.0),
            Reading::new(2.0, 0.5, 4.0),
        ];
        let series = TrendSeries::from_readings(&readings);

        assert_eq!(series.voltage.points, vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(series.resistance.points, vec![(0.0, 2.0), (1.0, 4.0)]);
        assert_eq!(series.current.label, "Current (A)");
        assert!(TrendSeries::from_readings(&[]).is_empty());
    }

    #[test]
    fn test_trend_series_time_labels() {
        let readings = vec![
            Reading::at(1.0, 0.5, 2.0, Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()),
            Reading::at(2.0, 0.5, 4.0, Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 8).unwrap()),
        ];
        let series = TrendSeries::from_readings(&readings);

        assert_eq!(series.labels, vec!["14:05:07", "14:05:08"]);
        assert_eq!(series.labels.len(), series.voltage.points.len());
    }

    #[test]
    fn test_table_row_format() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let row = TableRow::from_reading(&Reading::at(5.5, 0.25, 22.0, ts));

        assert_eq!(row.timestamp, "2024-03-09 14:05:07");
        assert_eq!(row.voltage, "5.50 V");
        assert_eq!(row.current, "0.25 A");
        assert_eq!(row.resistance, "22.00 Ω");
    }

    #[test]
    fn test_format_gauge() {
        assert_eq!(format_gauge(5.0), "5");
        assert_eq!(format_gauge(5.5), "5.5");
        assert_eq!(format_gauge(3.14159), "3.14");
        assert_eq!(format_gauge(-0.001), "0");
    }
}
