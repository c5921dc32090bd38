//! Periodic sampler
//!
//! Pulls samples from a [`SampleSource`] on a fixed interval, records them
//! into the shared history and publishes each stored reading to subscribers.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

use crate::history::{Reading, SharedHistory};
use crate::simulator::Sample;

/// Default interval between samples
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Capacity of the update channel before slow subscribers start lagging
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Something that produces measurements on demand
pub trait SampleSource: Send + 'static {
    /// Next sample, or `None` once the source is exhausted
    fn next_sample(&mut self) -> Option<Sample>;

    /// Stop after `count` samples
    fn take(self, count: usize) -> Take<Self>
    where
        Self: Sized,
    {
        Take {
            inner: self,
            remaining: count,
        }
    }
}

/// Source adapter yielding at most a fixed number of samples
pub struct Take<S> {
    inner: S,
    remaining: usize,
}

impl<S: SampleSource> SampleSource for Take<S> {
    fn next_sample(&mut self) -> Option<Sample> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_sample()
    }
}

/// Spawns sampling tasks
pub struct Sampler;

impl Sampler {
    /// Start sampling `source` every `interval` into `history`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: SampleSource>(
        mut source: S,
        history: SharedHistory,
        interval: Duration,
    ) -> SamplerHandle {
        let interval = interval.max(Duration::from_millis(1));
        // The task owns the only sender, so subscribers see `Closed` once it ends
        let (tx, updates) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let Some(sample) = source.next_sample() else {
                    tracing::debug!("Sample source exhausted, stopping sampler");
                    break;
                };

                let reading = Reading::new(sample.voltage, sample.current, sample.resistance);
                history.push(reading.clone());
                // No subscribers is fine
                let _ = tx.send(reading);
            }
        });

        tracing::debug!("Sampler started with {:?} interval", interval);
        SamplerHandle { task, updates }
    }
}

/// Handle to a running sampler task
pub struct SamplerHandle {
    task: JoinHandle<()>,
    updates: broadcast::Receiver<Reading>,
}

impl SamplerHandle {
    /// Receive every reading stored from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Reading> {
        self.updates.resubscribe()
    }

    /// Check whether the task has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Abort the sampling task
    pub fn stop(self) {
        self.task.abort();
        tracing::debug!("Sampler stopped");
    }

    /// Wait for the source to be exhausted
    pub async fn wait(self) -> Result<(), JoinError> {
        self.task.await
    }
}
