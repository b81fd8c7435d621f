//! Broker Connectivity for the Aerosim Telemetry Publisher
//!
//! ## Overview
//!
//! This crate owns everything between a generated sample and the broker:
//! the [`AsyncConnector`] abstraction, the MQTT implementation behind the
//! `mqtt` feature, and the [`publisher`] that schedules fire-and-forget
//! publish ticks on the tokio runtime.
//!
//! ## Delivery semantics
//!
//! The simulator publishes with [`QoS::AtLeastOnce`]: the broker may see a
//! message more than once, it will never be silently dropped by the
//! transport. Everything above that is best-effort sample policy — no
//! retry, no backoff, no dead-letter path. A production deployment would
//! add all three; this crate deliberately does not.
//!
//! ## Sharing model
//!
//! One connection handle is shared read-only by every scheduled tick, so
//! [`AsyncConnector::publish`] takes `&self` and implementations must
//! multiplex concurrent publishes safely (rumqttc's client already does).
//! Per-connector counters live in a [`StatsRecorder`] so the shared handle
//! can account for traffic without locking the publish path.

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "mqtt")]
pub mod mqtt;

pub mod publisher;

// Re-export common types
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttConnection, MqttError, TlsIdentity};
pub use publisher::{RunHandle, TelemetryPublisher, TickError, TickOutcome};

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Common connector errors.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connection is not established.
    #[error("not connected")]
    NotConnected,

    /// The operation did not complete in time.
    #[error("timeout")]
    Timeout,

    /// Transport-level failure.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Delivery guarantee requested for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QoS {
    /// Fire once, no acknowledgment.
    AtMostOnce,
    /// Guaranteed to arrive, may arrive more than once. The simulator
    /// always publishes at this level.
    #[default]
    AtLeastOnce,
    /// Guaranteed to arrive exactly once.
    ExactlyOnce,
}

/// Async broker connection shared by all scheduled ticks.
#[async_trait]
pub trait AsyncConnector: Send + Sync {
    /// Transport failure type.
    type Error: std::error::Error + Send + 'static;

    /// Publish one payload to `topic` with the requested delivery level.
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error>;

    /// Whether the broker has acknowledged the session.
    fn is_connected(&self) -> bool;

    /// Snapshot of this connection's traffic counters.
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Total messages sent successfully.
    pub messages_sent: u64,
    /// Total messages that failed to send.
    pub messages_failed: u64,
    /// Total payload bytes sent.
    pub bytes_sent: u64,
    /// Number of reconnections after the initial session.
    pub reconnections: u32,
    /// Most recent error message.
    pub last_error: Option<String>,
}

/// Lock-free counters behind a shared connector handle.
///
/// The publish path only touches atomics; the last-error slot is the one
/// mutex and is only taken on failure.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    messages_sent: AtomicU64,
    messages_failed: AtomicU64,
    bytes_sent: AtomicU64,
    reconnections: AtomicU32,
    last_error: Mutex<Option<String>>,
}

impl StatsRecorder {
    /// Count one successful publish of `bytes` payload bytes.
    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Count one failed publish and remember the error.
    pub fn record_failure(&self, error: &dyn fmt::Display) {
        self.messages_failed.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.last_error.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(error.to_string());
    }

    /// Count a reconnection after the initial session.
    pub fn record_reconnection(&self) {
        self.reconnections.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters out.
    pub fn snapshot(&self) -> ConnectionStats {
        ConnectionStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_failed: self.messages_failed.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            reconnections: self.reconnections.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_counts_traffic() {
        let stats = StatsRecorder::default();
        stats.record_sent(100);
        stats.record_sent(50);
        stats.record_failure(&ConnectorError::Timeout);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages_sent, 2);
        assert_eq!(snapshot.messages_failed, 1);
        assert_eq!(snapshot.bytes_sent, 150);
        assert_eq!(snapshot.last_error.as_deref(), Some("timeout"));
    }
}
