//! Live measurement feed
//!
//! Adapter for a push-based real-time source that reports voltage, current
//! and power state as independent values. Every voltage or current change
//! records a reading into the shared history and is published to
//! subscribers over a broadcast channel.
//!
//! Sources that speak newline-delimited JSON (`{"voltage":12.0}`,
//! `{"power":true}`) are bridged with [`forward_lines`]. Power switch
//! requests travel the other way as [`PowerCommand`]s and only change the
//! reported state once the device acknowledges them.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::history::SharedHistory;
use crate::simulator::Sample;

/// Capacity of the update channel before slow subscribers start lagging
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Errors from power switch requests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("No power control attached to the live feed")]
    NotConnected,

    #[error("Power request rejected: {0}")]
    Rejected(String),

    #[error("Power control disconnected")]
    Disconnected,
}

/// A power switch request sent to the device side
#[derive(Debug)]
pub struct PowerCommand {
    /// Requested switch state
    pub on: bool,
    /// Acknowledgement, or the device's reason for refusing
    pub reply: oneshot::Sender<Result<(), String>>,
}

/// A value pushed by the real-time source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedEvent {
    /// New voltage in volts
    Voltage(f64),
    /// New current in amperes
    Current(f64),
    /// Power switch state
    Power(bool),
    /// The source reported a failure
    Error(String),
}

/// Notification sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// Latest voltage/current pair with derived resistance
    Measurement(Sample),
    /// Power switch state changed
    Power(bool),
    /// The source reported a failure
    Error(String),
}

#[derive(Debug, Default)]
struct FeedState {
    voltage: f64,
    current: f64,
    power_on: bool,
}

/// Live feed shared between the source task and its consumers
#[derive(Debug, Clone)]
pub struct LiveFeed {
    history: SharedHistory,
    state: Arc<Mutex<FeedState>>,
    updates: broadcast::Sender<FeedUpdate>,
    power_control: Option<mpsc::Sender<PowerCommand>>,
}

impl LiveFeed {
    /// Create a feed recording into `history`
    pub fn new(history: SharedHistory) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            history,
            state: Arc::new(Mutex::new(FeedState::default())),
            updates,
            power_control: None,
        }
    }

    /// Create a feed that can also switch the device's power
    pub fn with_power_control(history: SharedHistory, control: mpsc::Sender<PowerCommand>) -> Self {
        Self {
            power_control: Some(control),
            ..Self::new(history)
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one event from the source
    pub fn apply(&self, event: FeedEvent) {
        let update = match event {
            FeedEvent::Voltage(voltage) => {
                let mut state = self.state();
                state.voltage = voltage;
                self.record(&state)
            }
            FeedEvent::Current(current) => {
                let mut state = self.state();
                state.current = current;
                self.record(&state)
            }
            FeedEvent::Power(on) => {
                self.state().power_on = on;
                FeedUpdate::Power(on)
            }
            FeedEvent::Error(message) => {
                tracing::warn!("Live feed error: {message}");
                FeedUpdate::Error(message)
            }
        };

        // No subscribers is fine
        let _ = self.updates.send(update);
    }

    fn record(&self, state: &FeedState) -> FeedUpdate {
        let sample = Sample::from_measurement(state.voltage, state.current);
        self.history
            .add(sample.voltage, sample.current, sample.resistance);
        FeedUpdate::Measurement(sample)
    }

    /// Subscribe to updates
    ///
    /// Also returns the current state: the latest measurement when either
    /// value is non-zero, followed by the power state.
    pub fn subscribe(&self) -> (broadcast::Receiver<FeedUpdate>, Vec<FeedUpdate>) {
        let state = self.state();
        let rx = self.updates.subscribe();

        let mut initial = Vec::with_capacity(2);
        if state.voltage != 0.0 || state.current != 0.0 {
            initial.push(FeedUpdate::Measurement(Sample::from_measurement(
                state.voltage,
                state.current,
            )));
        }
        initial.push(FeedUpdate::Power(state.power_on));

        (rx, initial)
    }

    /// Latest voltage/current pair
    pub fn latest(&self) -> Sample {
        let state = self.state();
        Sample::from_measurement(state.voltage, state.current)
    }

    /// Current power switch state
    pub fn is_power_on(&self) -> bool {
        self.state().power_on
    }

    /// Ask the device to switch power on or off
    ///
    /// The reported power state changes only after the device acknowledges.
    /// On failure an [`FeedUpdate::Error`] is published and the state is
    /// left as it was.
    pub async fn request_power(&self, on: bool) -> Result<(), FeedError> {
        let result = self.send_power_command(on).await;
        match &result {
            Ok(()) => self.apply(FeedEvent::Power(on)),
            Err(e) => {
                tracing::warn!("Power request failed: {e}");
                let _ = self.updates.send(FeedUpdate::Error(e.to_string()));
            }
        }
        result
    }

    async fn send_power_command(&self, on: bool) -> Result<(), FeedError> {
        let control = self.power_control.as_ref().ok_or(FeedError::NotConnected)?;
        let (reply, ack) = oneshot::channel();
        control
            .send(PowerCommand { on, reply })
            .await
            .map_err(|_| FeedError::Disconnected)?;
        match ack.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(FeedError::Rejected(reason)),
            Err(_) => Err(FeedError::Disconnected),
        }
    }

    /// Consume events until the source closes its side of the channel
    ///
    /// Samples already stored stay in the history after disconnection.
    pub async fn run(&self, mut events: mpsc::Receiver<FeedEvent>) {
        tracing::debug!("Started listening to live feed");
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
        tracing::debug!("Live feed source disconnected");
    }
}

/// Parse newline-delimited JSON events from `reader` into `events`
///
/// Blank lines are skipped. A malformed line is forwarded as
/// [`FeedEvent::Error`] so consumers see it. Stops at end of input or when
/// the receiving side is gone. Returns the number of events forwarded.
pub async fn forward_lines<R>(reader: R, events: mpsc::Sender<FeedEvent>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).unwrap_or_else(|e| {
            tracing::warn!("Malformed feed line {line:?}: {e}");
            FeedEvent::Error(format!("malformed feed line: {e}"))
        });
        if events.send(event).await.is_err() {
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}

/// Write each power command to `writer` as a JSON line and acknowledge it
///
/// A command whose write fails is refused with the I/O error and the
/// error is returned. Runs until every command sender is dropped.
pub async fn write_power_commands<W>(
    mut writer: W,
    mut commands: mpsc::Receiver<PowerCommand>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(PowerCommand { on, reply }) = commands.recv().await {
        let mut line = serde_json::to_string(&FeedEvent::Power(on))?;
        line.push('\n');

        let written = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await;

        match written {
            Ok(()) => {
                let _ = reply.send(Ok(()));
            }
            Err(e) => {
                let _ = reply.send(Err(e.to_string()));
                return Err(e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_events_record_readings() {
        let history = SharedHistory::default();
        let feed = LiveFeed::new(history.clone());

        feed.apply(FeedEvent::Voltage(12.0));
        feed.apply(FeedEvent::Current(2.0));

        let readings = history.get_all();
        assert_eq!(readings.len(), 2);
        // Current still zero on the first event
        assert_eq!(readings[0].resistance(), 0.0);
        assert_eq!(readings[1].resistance(), 6.0);
    }

    #[test]
    fn test_power_and_error_do_not_record() {
        let history = SharedHistory::default();
        let feed = LiveFeed::new(history.clone());

        feed.apply(FeedEvent::Power(true));
        feed.apply(FeedEvent::Error("permission denied".into()));

        assert!(feed.is_power_on());
        assert!(history.is_empty());
    }

    #[test]
    fn test_subscribe_initial_state() {
        let feed = LiveFeed::new(SharedHistory::default());

        let (_, initial) = feed.subscribe();
        assert_eq!(initial, vec![FeedUpdate::Power(false)]);

        feed.apply(FeedEvent::Voltage(9.0));
        let (_, initial) = feed.subscribe();
        assert_eq!(
            initial,
            vec![
                FeedUpdate::Measurement(Sample::from_measurement(9.0, 0.0)),
                FeedUpdate::Power(false),
            ]
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event: FeedEvent = serde_json::from_str(r#"{"voltage":12.5}"#).unwrap();
        assert_eq!(event, FeedEvent::Voltage(12.5));

        let event: FeedEvent = serde_json::from_str(r#"{"power":true}"#).unwrap();
        assert_eq!(event, FeedEvent::Power(true));

        assert_eq!(
            serde_json::to_string(&FeedEvent::Power(false)).unwrap(),
            r#"{"power":false}"#
        );
    }

    #[tokio::test]
    async fn test_power_without_control_is_refused() {
        let feed = LiveFeed::new(SharedHistory::default());
        let (mut updates, _) = feed.subscribe();

        assert_eq!(feed.request_power(true).await, Err(FeedError::NotConnected));
        assert!(!feed.is_power_on());
        assert!(matches!(updates.try_recv(), Ok(FeedUpdate::Error(_))));
    }
}
