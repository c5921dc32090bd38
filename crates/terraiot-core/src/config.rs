//! Monitor configuration
//!
//! Settings stored as JSON. Every field has a default, so a partial or empty
//! file is valid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::MAX_READINGS;
use crate::simulator::{SampleRanges, ValueRange};
use crate::view::HistoryRange;

/// Largest accepted history capacity
pub const MAX_HISTORY_CAPACITY: usize = 1_000_000;

/// Errors that can occur while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Monitor configuration stored in terraiot.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Maximum number of readings kept in memory
    pub history_capacity: usize,

    /// Interval between simulated samples in milliseconds
    pub update_interval_ms: u64,

    /// Simulated voltage range in volts
    pub voltage_range: ValueRange,

    /// Simulated current range in amperes
    pub current_range: ValueRange,

    /// Range shown by trend views on open
    pub default_range: HistoryRange,

    /// Directory for exported CSV files (working directory if unset)
    pub export_dir: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let ranges = SampleRanges::default();
        Self {
            history_capacity: MAX_READINGS,
            update_interval_ms: 1000,
            voltage_range: ranges.voltage,
            current_range: ranges.current,
            default_range: HistoryRange::default(),
            export_dir: None,
        }
    }
}

impl MonitorConfig {
    /// Load and validate configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MonitorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 || self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "history_capacity must be between 1 and {}",
                MAX_HISTORY_CAPACITY
            )));
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "update_interval_ms must be positive".to_string(),
            ));
        }
        if self.default_range == HistoryRange::Recent(0) {
            return Err(ConfigError::Invalid(
                "default_range must be 'all' or a positive count".to_string(),
            ));
        }
        self.sample_ranges()
            .validate()
            .map_err(ConfigError::Invalid)
    }

    /// Simulator ranges from this configuration
    pub fn sample_ranges(&self) -> SampleRanges {
        SampleRanges {
            voltage: self.voltage_range,
            current: self.current_range,
        }
    }

    /// Full path for an export file name
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        match &self.export_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
