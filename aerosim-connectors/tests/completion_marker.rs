//! Terminal completion marker behavior
//!
//! Lives in its own test binary: it installs a process-global capturing
//! logger, and sharing that with unrelated parallel tests would make the
//! captured stream meaningless.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use log::{LevelFilter, Log, Metadata, Record};
use rand::{rngs::StdRng, SeedableRng};

use aerosim_connectors::{
    AsyncConnector, ConnectionStats, ConnectorError, QoS, StatsRecorder, TelemetryPublisher,
};
use aerosim_core::{FixedClock, GeneratorConfig, PublishSchedule, SampleGenerator, SchemaVersion};

static CAPTURED: OnceLock<Mutex<Vec<String>>> = OnceLock::new();

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        CAPTURED
            .get_or_init(|| Mutex::new(Vec::new()))
            .lock()
            .unwrap()
            .push(record.args().to_string());
    }

    fn flush(&self) {}
}

fn captured() -> Vec<String> {
    CAPTURED
        .get_or_init(|| Mutex::new(Vec::new()))
        .lock()
        .unwrap()
        .clone()
}

/// Succeeds on even calls, fails on odd ones.
struct FlakyConnector {
    stats: StatsRecorder,
    calls: Mutex<usize>,
}

#[async_trait]
impl AsyncConnector for FlakyConnector {
    type Error = ConnectorError;

    async fn publish(&self, _topic: &str, payload: &[u8], _qos: QoS) -> Result<(), ConnectorError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if call % 2 == 1 {
            let err = ConnectorError::Protocol("flaky".into());
            self.stats.record_failure(&err);
            return Err(err);
        }
        self.stats.record_sent(payload.len());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.snapshot()
    }
}

fn generator(seed: u64) -> SampleGenerator<StdRng> {
    SampleGenerator::new(GeneratorConfig::air_purifier(), StdRng::seed_from_u64(seed)).unwrap()
}

static LOGGER: CaptureLogger = CaptureLogger;

#[tokio::test(start_paused = true)]
async fn marker_fires_once_after_the_final_tick() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);

    let connector = Arc::new(FlakyConnector {
        stats: StatsRecorder::default(),
        calls: Mutex::new(0),
    });
    let publisher = TelemetryPublisher::new(
        Arc::clone(&connector),
        SchemaVersion::V1.default_topic(),
        SchemaVersion::V1,
    );

    // An empty run never reaches a final tick, so no marker
    publisher
        .run(
            PublishSchedule::new(0, Duration::from_millis(100)),
            generator(1),
            Arc::new(FixedClock::new(0)),
        )
        .join_all()
        .await;
    assert_eq!(
        captured()
            .iter()
            .filter(|line| line.as_str() == "Published all messages")
            .count(),
        0
    );

    // Three ticks, one of which fails: the marker still fires exactly once
    publisher
        .run(
            PublishSchedule::new(3, Duration::from_millis(100)),
            generator(2),
            Arc::new(FixedClock::new(0)),
        )
        .join_all()
        .await;

    let lines = captured();
    let markers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.as_str() == "Published all messages")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(markers.len(), 1, "marker must fire exactly once");

    // ...and only after the final tick started
    let last_tick_start = lines
        .iter()
        .position(|line| line.as_str() == "Publishing message 2...")
        .expect("final tick should log its start");
    assert!(markers[0] > last_tick_start);

    // Per-tick pairs: every tick logged a start, the failed one logged a
    // failure instead of a completion
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.starts_with("Publishing message"))
            .count(),
        3
    );
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.starts_with("Published message"))
            .count(),
        2
    );
    assert_eq!(
        lines
            .iter()
            .filter(|line| line.contains("failed"))
            .count(),
        1
    );
}
