//! Fire-and-forget telemetry publisher
//!
//! Schedules one independent task per tick: task `i` sleeps the tick's
//! nominal offset, draws one sample, encodes it and publishes it. The
//! scheduler never awaits a publish, so tick ordering is enforced only at
//! scheduling time — when the interval is shorter than a publish
//! round-trip, several publishes are in flight at once and their
//! completion order is unspecified. That is the intended best-effort
//! behavior, not an oversight.
//!
//! Each task owns its error boundary: a failed tick is logged with its
//! index and the remaining ticks keep their original schedule. There is no
//! retry and no cancellation; once [`TelemetryPublisher::run`] returns,
//! every tick will attempt to fire even if the connection has dropped.

use std::sync::{Arc, Mutex};

use log::{info, warn};
use rand::Rng;
use thiserror::Error;
use tokio::task::JoinHandle;

use aerosim_core::{
    errors::ValidationError,
    wire::{self, WireError},
    Clock, PublishSchedule, SampleGenerator, SampleValidator, SchemaVersion,
};

use crate::{AsyncConnector, QoS};

/// Why a single tick produced no published message.
#[derive(Debug, Error)]
pub enum TickError<E>
where
    E: std::error::Error + 'static,
{
    /// The generated sample violated its documented ranges.
    #[error("generated sample failed validation: {0}")]
    Invalid(#[source] ValidationError),

    /// The sample could not be serialized.
    #[error("payload encoding failed: {0}")]
    Encode(#[source] WireError),

    /// The transport rejected the publish.
    #[error("publish failed: {0}")]
    Publish(#[source] E),
}

/// Result of one fired tick.
#[derive(Debug)]
pub struct TickOutcome<E>
where
    E: std::error::Error + 'static,
{
    /// Tick index, `0..count`.
    pub index: u32,
    /// Whether this tick's publish was handed to the transport.
    pub result: Result<(), TickError<E>>,
}

/// Handle over a scheduled run.
///
/// A run counts as complete the moment this handle exists: all ticks are
/// scheduled. Joining exists so callers can keep the process alive and
/// collect per-tick outcomes; it adds no delivery guarantee.
pub struct RunHandle<E>
where
    E: std::error::Error + Send + 'static,
{
    tasks: Vec<JoinHandle<TickOutcome<E>>>,
}

impl<E> RunHandle<E>
where
    E: std::error::Error + Send + 'static,
{
    /// Number of ticks scheduled.
    pub fn scheduled(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every tick task and return outcomes in index order.
    pub async fn join_all(self) -> Vec<TickOutcome<E>> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                // A tick task only ends early if the runtime is shutting down
                Err(err) => warn!("tick task aborted: {err}"),
            }
        }
        outcomes
    }
}

/// Publishes a bounded run of samples to one fixed topic.
pub struct TelemetryPublisher<C> {
    connector: Arc<C>,
    topic: String,
    schema: SchemaVersion,
    validator: Option<SampleValidator>,
}

impl<C> TelemetryPublisher<C>
where
    C: AsyncConnector + 'static,
{
    /// Publisher for `topic`, encoding payloads with `schema`.
    pub fn new(connector: Arc<C>, topic: impl Into<String>, schema: SchemaVersion) -> Self {
        Self {
            connector,
            topic: topic.into(),
            schema,
            validator: None,
        }
    }

    /// Check every generated sample against `validator` before publishing.
    pub fn with_validator(mut self, validator: SampleValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Schedule the whole run and return immediately.
    ///
    /// Spawns `schedule.count()` tasks onto the current runtime. The task
    /// for the final index logs the terminal "Published all messages"
    /// marker after its own publish attempt, whatever the outcome of
    /// earlier ticks.
    pub fn run<R, K>(
        &self,
        schedule: PublishSchedule,
        generator: SampleGenerator<R>,
        clock: Arc<K>,
    ) -> RunHandle<C::Error>
    where
        R: Rng + Send + 'static,
        K: Clock + Send + Sync + ?Sized + 'static,
    {
        let generator = Arc::new(Mutex::new(generator));
        let mut tasks = Vec::with_capacity(schedule.count() as usize);

        for tick in schedule.ticks() {
            let connector = Arc::clone(&self.connector);
            let generator = Arc::clone(&generator);
            let clock = Arc::clone(&clock);
            let topic = self.topic.clone();
            let schema = self.schema;
            let validator = self.validator.clone();
            let index = tick.index;
            let last = schedule.is_last(index);

            tasks.push(tokio::spawn(async move {
                tokio::time::sleep(tick.offset).await;
                info!("Publishing message {index}...");

                let result = fire(
                    &*connector,
                    &topic,
                    schema,
                    validator.as_ref(),
                    &generator,
                    &*clock,
                )
                .await;

                match &result {
                    Ok(()) => info!("Published message {index}"),
                    Err(err) => warn!("message {index} failed: {err}"),
                }
                if last {
                    info!("Published all messages");
                }

                TickOutcome { index, result }
            }));
        }

        RunHandle { tasks }
    }
}

/// One tick's generate-encode-publish sequence.
async fn fire<C, R, K>(
    connector: &C,
    topic: &str,
    schema: SchemaVersion,
    validator: Option<&SampleValidator>,
    generator: &Mutex<SampleGenerator<R>>,
    clock: &K,
) -> Result<(), TickError<C::Error>>
where
    C: AsyncConnector,
    R: Rng,
    K: Clock + ?Sized,
{
    let timestamp = clock.now();
    let sample = {
        let mut generator = generator.lock().unwrap_or_else(|e| e.into_inner());
        generator.next_sample(timestamp)
    };

    if let Some(validator) = validator {
        validator.validate(&sample).map_err(TickError::Invalid)?;
    }

    let payload = wire::encode(&sample, schema).map_err(TickError::Encode)?;
    connector
        .publish(topic, &payload, QoS::AtLeastOnce)
        .await
        .map_err(TickError::Publish)?;

    Ok(())
}
