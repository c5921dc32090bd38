//! terraiot-monitor: composition root for the TerraIoT electrical monitor.
//!
//! Run with:  `RUST_LOG=debug terraiot-monitor run -n 20`

mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use terraiot_core::config::MonitorConfig;
use terraiot_core::export;
use terraiot_core::feed::{self, FeedUpdate, LiveFeed};
use terraiot_core::history::{Reading, SharedHistory};
use terraiot_core::sampler::{SampleSource, Sampler};
use terraiot_core::simulator::{Sample, Simulator};
use terraiot_core::view::{format_gauge, HistoryRange, TableRow};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("terraiot-monitor v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::InitConfig { force } => init_config(&cli.config, force),
        Command::Run {
            samples,
            interval_ms,
            seed,
            range,
            export,
        } => {
            let config = load_config(&cli.config)?;
            let range = range.unwrap_or(config.default_range);
            run(&config, samples, interval_ms, seed, range, export).await
        }
        Command::Listen {
            power,
            range,
            export,
        } => {
            let config = load_config(&cli.config)?;
            let range = range.unwrap_or(config.default_range);
            listen(&config, power.map(|p| p.is_on()), range, export).await
        }
        Command::Export {
            samples,
            seed,
            range,
            output,
        } => {
            let config = load_config(&cli.config)?;
            export_simulated(&config, samples, seed, range, output)
        }
    }
}

fn load_config(path: &Path) -> Result<MonitorConfig> {
    MonitorConfig::load_or_default(path)
        .with_context(|| format!("loading config from {}", path.display()))
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    MonitorConfig::default()
        .save(path)
        .with_context(|| format!("writing config to {}", path.display()))?;
    tracing::info!("Wrote default config to {}", path.display());
    Ok(())
}

fn simulator(config: &MonitorConfig, seed: Option<u64>) -> Result<Simulator> {
    let ranges = config.sample_ranges();
    let sim = match seed {
        Some(seed) => Simulator::seeded(ranges, seed)?,
        None => Simulator::new(ranges)?,
    };
    Ok(sim)
}

async fn run(
    config: &MonitorConfig,
    samples: Option<usize>,
    interval_ms: Option<u64>,
    seed: Option<u64>,
    range: HistoryRange,
    export_path: Option<PathBuf>,
) -> Result<()> {
    let history = SharedHistory::with_capacity(config.history_capacity);
    let interval = Duration::from_millis(interval_ms.unwrap_or(config.update_interval_ms));
    let sim = simulator(config, seed)?;

    let handle = match samples {
        Some(count) => Sampler::spawn(sim.take(count), history.clone(), interval),
        None => Sampler::spawn(sim, history.clone(), interval),
    };
    let mut updates = handle.subscribe();

    tracing::info!(
        "Sampling every {:?} into a history of {} readings (Ctrl-C to stop)",
        interval,
        history.capacity()
    );

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(reading) => show_dashboard(&reading),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Display fell behind, skipped {skipped} readings");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }
    handle.stop();

    finish(&history, range, export_path);
    Ok(())
}

async fn listen(
    config: &MonitorConfig,
    power: Option<bool>,
    range: HistoryRange,
    export_path: Option<PathBuf>,
) -> Result<()> {
    let history = SharedHistory::with_capacity(config.history_capacity);

    let (control, commands) = mpsc::channel(4);
    let live = LiveFeed::with_power_control(history.clone(), control);
    let writer = tokio::spawn(feed::write_power_commands(tokio::io::stdout(), commands));

    let (events_tx, events) = mpsc::channel(64);
    let reader = tokio::spawn(feed::forward_lines(
        BufReader::new(tokio::io::stdin()),
        events_tx,
    ));

    let (mut updates, initial) = live.subscribe();
    initial.iter().for_each(show_update);

    let mut runner = {
        let live = live.clone();
        tokio::spawn(async move { live.run(events).await })
    };

    if let Some(on) = power {
        if let Err(e) = live.request_power(on).await {
            tracing::error!("{e}");
        }
    }

    tracing::info!("Listening for feed events on stdin (end input to stop)");
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => show_update(&update),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Display fell behind, skipped {skipped} updates");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut runner => break,
        }
    }
    while let Ok(update) = updates.try_recv() {
        show_update(&update);
    }
    writer.abort();

    match reader.await {
        Ok(Ok(count)) => tracing::debug!("Feed ended after {count} events"),
        Ok(Err(e)) => tracing::error!("Reading feed failed: {e}"),
        Err(e) => tracing::error!("Feed reader task failed: {e}"),
    }

    finish(&history, range, export_path);
    Ok(())
}

fn finish(history: &SharedHistory, range: HistoryRange, export_path: Option<PathBuf>) {
    let selected = history.select(range);
    print_table(&selected, range);

    if let Some(path) = export_path {
        match export::export_to_path(&path, &selected) {
            Ok(summary) => println!(
                "Exported {} readings to {}",
                summary.rows,
                summary.path.display()
            ),
            Err(e) => tracing::error!("Export failed: {e}"),
        }
    }
}

fn export_simulated(
    config: &MonitorConfig,
    samples: Option<usize>,
    seed: Option<u64>,
    range: HistoryRange,
    output: Option<PathBuf>,
) -> Result<()> {
    let history = SharedHistory::with_capacity(config.history_capacity);
    let mut sim = simulator(config, seed)?;

    for _ in 0..samples.unwrap_or(config.history_capacity) {
        let sample = sim.generate();
        history.add(sample.voltage, sample.current, sample.resistance);
    }

    let path = output
        .unwrap_or_else(|| config.export_path(&export::default_file_name(Local::now())));
    let summary = export::export_to_path(&path, &history.select(range))
        .with_context(|| format!("exporting {} to {}", range, path.display()))?;

    println!(
        "Exported {} readings to {}",
        summary.rows,
        summary.path.display()
    );
    Ok(())
}

fn show_dashboard(reading: &Reading) {
    println!(
        "{}  {} V  {} A  {} Ω",
        reading.timestamp().format("%H:%M:%S"),
        format_gauge(reading.voltage()),
        format_gauge(reading.current()),
        format_gauge(reading.resistance())
    );
}

fn show_update(update: &FeedUpdate) {
    match update {
        FeedUpdate::Measurement(Sample {
            voltage,
            current,
            resistance,
        }) => eprintln!(
            "{}  {} V  {} A  {} Ω",
            Local::now().format("%H:%M:%S"),
            format_gauge(*voltage),
            format_gauge(*current),
            format_gauge(*resistance)
        ),
        FeedUpdate::Power(on) => eprintln!("Power {}", if *on { "on" } else { "off" }),
        FeedUpdate::Error(message) => eprintln!("Feed error: {message}"),
    }
}

fn print_table(readings: &[Reading], range: HistoryRange) {
    if readings.is_empty() {
        println!("No readings ({range})");
        return;
    }

    println!("\nHistory ({range}, {} readings)", readings.len());
    println!(
        "{:<19}  {:>10}  {:>10}  {:>12}",
        "Timestamp", "Voltage", "Current", "Resistance"
    );
    for row in TableRow::rows(readings) {
        println!(
            "{:<19}  {:>10}  {:>10}  {:>12}",
            row.timestamp, row.voltage, row.current, row.resistance
        );
    }
}
