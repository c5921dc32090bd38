//! CSV export
//!
//! Writes reading snapshots in the fixed CSV layout:
//!
//! ```text
//! Timestamp,Voltage (V),Current (A),Resistance (Ω)
//! 2024-03-09 14:05:07,5.50,0.25,22.00
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::history::Reading;

/// Header line of every exported file
pub const CSV_HEADER: &str = "Timestamp,Voltage (V),Current (A),Resistance (Ω)";

/// Timestamp layout used in exported rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data available to export")]
    NoData,

    #[error("Error exporting data to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File that was written
    pub path: PathBuf,
    /// Number of data rows (header excluded)
    pub rows: usize,
}

/// Format one reading as a CSV line without the trailing newline
pub fn format_row(reading: &Reading) -> String {
    format!(
        "{},{:.2},{:.2},{:.2}",
        reading.timestamp().format(TIMESTAMP_FORMAT),
        reading.voltage(),
        reading.current(),
        reading.resistance()
    )
}

/// Write readings as CSV to any writer
pub fn write_csv<W: Write>(mut writer: W, readings: &[Reading]) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for reading in readings {
        writeln!(writer, "{}", format_row(reading))?;
    }
    writer.flush()
}

/// Render readings as a CSV document
pub fn to_csv_string(readings: &[Reading]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + readings.len() * 40);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for reading in readings {
        out.push_str(&format_row(reading));
        out.push('\n');
    }
    out
}

/// Export readings to a CSV file at `path`
///
/// An empty selection is refused so no header-only file is produced.
pub fn export_to_path<P: AsRef<Path>>(
    path: P,
    readings: &[Reading],
) -> Result<ExportSummary, ExportError> {
    let path = path.as_ref();
    if readings.is_empty() {
        return Err(ExportError::NoData);
    }

    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    if let Err(e) = write_csv(BufWriter::new(file), readings) {
        tracing::error!("Error exporting CSV to {}: {e}", path.display());
        return Err(io_err(e));
    }

    tracing::info!("Exported {} readings to {}", readings.len(), path.display());
    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: readings.len(),
    })
}

/// Default export file name for the given moment
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("electrical_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
