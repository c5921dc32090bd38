use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use terraiot_core::view::HistoryRange;

/// TerraIoT electrical monitor
#[derive(Parser, Debug)]
#[command(name = "terraiot-monitor")]
#[command(author, version, about = "Simulated electrical monitor with bounded history and CSV export")]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, short, global = true, default_value = "terraiot.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sample the simulator on its update interval and show readings
    Run {
        /// Stop after this many samples (runs until Ctrl-C when omitted)
        #[arg(long, short = 'n')]
        samples: Option<usize>,

        /// Override the configured update interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Seed for reproducible samples
        #[arg(long)]
        seed: Option<u64>,

        /// Range shown in the final table: 'all' or a positive count
        #[arg(long, short)]
        range: Option<HistoryRange>,

        /// Export the selected range to this CSV file on exit
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Generate samples immediately and export them to CSV
    Export {
        /// Number of samples to generate (defaults to the history capacity)
        #[arg(long, short = 'n')]
        samples: Option<usize>,

        /// Seed for reproducible samples
        #[arg(long)]
        seed: Option<u64>,

        /// Range to export: 'all' or a positive count
        #[arg(long, short, default_value = "all")]
        range: HistoryRange,

        /// Output file (defaults to electrical_data_<timestamp>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Follow a live feed of JSON lines on stdin until end of input
    ///
    /// Each line is one event: {"voltage":12.0}, {"current":0.5},
    /// {"power":true} or {"error":"..."}. Readings are shown on stderr.
    Listen {
        /// Switch the device power; the request is written to stdout as a JSON line
        #[arg(long, value_enum)]
        power: Option<PowerSwitch>,

        /// Range shown in the final table: 'all' or a positive count
        #[arg(long, short)]
        range: Option<HistoryRange>,

        /// Export the selected range to this CSV file on exit
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Write the default configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Requested power switch state
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerSwitch {
    On,
    Off,
}

impl PowerSwitch {
    pub fn is_on(self) -> bool {
        self == PowerSwitch::On
    }
}
