//! # TerraIoT Core Library
//!
//! Core functionality for the TerraIoT electrical monitor.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - A bounded, chronologically ordered history of electrical readings
//! - Simulated and live (push-based) measurement producers
//! - Trend range selection and chart/table projections
//! - CSV export of the stored history
//! - JSON configuration
//!
//! ## Example
//!
//! ```rust
//! use terraiot_core::history::ReadingHistory;
//! use terraiot_core::ohms_law;
//!
//! let mut history = ReadingHistory::new();
//! let (voltage, current) = (5.5, 0.25);
//! history.add(voltage, current, ohms_law::resistance(voltage, current));
//!
//! let csv = terraiot_core::export::to_csv_string(&history.get_all());
//! assert!(csv.starts_with("Timestamp,Voltage (V),Current (A),Resistance (Ω)\n"));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod history;
pub mod ohms_law;
pub mod sampler;
pub mod simulator;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::MonitorConfig;
    pub use crate::error::MonitorError;
    pub use crate::export::{export_to_path, ExportError, ExportSummary};
    pub use crate::feed::{FeedError, FeedEvent, FeedUpdate, LiveFeed, PowerCommand};
    pub use crate::history::{Reading, ReadingHistory, SharedHistory};
    pub use crate::sampler::{SampleSource, Sampler, SamplerHandle};
    pub use crate::simulator::{Sample, SampleRanges, Simulator};
    pub use crate::view::{HistoryRange, TableRow, TrendSeries};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
