//! MQTT connection over rumqttc
//!
//! Wraps `rumqttc`'s async client behind [`AsyncConnector`]. The event
//! loop runs in its own task; [`MqttConnection::connect`] resolves once
//! the broker acknowledges the session, so callers hold a connection that
//! is actually usable, not just configured. Mutual TLS is enabled by
//! attaching a [`TlsIdentity`] (CA plus client certificate and key, PEM).
//!
//! [`disconnect`](MqttConnection::disconnect) exists for completeness; the
//! device flow intentionally never calls it and leaves the connection open
//! at process exit.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, TlsConfiguration, Transport};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::{AsyncConnector, ConnectionStats, QoS, StatsRecorder};

/// PEM material for a mutual-TLS session.
pub struct TlsIdentity {
    /// Certificate authority chain.
    pub ca: Vec<u8>,
    /// Client certificate presented to the broker.
    pub client_cert: Vec<u8>,
    /// Private key for the client certificate.
    pub client_key: Vec<u8>,
}

/// MQTT connection configuration.
pub struct MqttConfig {
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Broker hostname.
    pub host: String,
    /// Broker port (8883 for mutual TLS, 1883 for plain TCP).
    pub port: u16,
    /// Keep-alive interval.
    pub keep_alive: Duration,
    /// Whether to start a fresh session instead of resuming one.
    pub clean_session: bool,
    /// Mutual-TLS material; plain TCP when absent.
    pub tls: Option<TlsIdentity>,
    /// Request channel capacity between client handle and event loop.
    pub capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            client_id: "aerosim-device".into(),
            host: "localhost".into(),
            port: 1883,
            keep_alive: Duration::from_secs(30),
            // Resume delivery of queued messages across sessions
            clean_session: false,
            tls: None,
            capacity: 10,
        }
    }
}

/// MQTT transport failures.
#[derive(Debug, Error)]
pub enum MqttError {
    /// TLS handshake or broker handshake failed at startup.
    #[error("connection failed: {0}")]
    Connect(#[source] rumqttc::ConnectionError),

    /// Event loop ended before the broker acknowledged the session.
    #[error("connection closed before broker acknowledged the session")]
    ConnectionClosed,

    /// A publish could not be handed to the event loop.
    #[error("publish failed: {0}")]
    Publish(#[source] rumqttc::ClientError),

    /// The disconnect request could not be delivered.
    #[error("disconnect failed: {0}")]
    Disconnect(#[source] rumqttc::ClientError),
}

/// A live MQTT session.
///
/// Cheap to share: publishing only needs `&self`, and rumqttc serializes
/// concurrent publishes through its request channel.
pub struct MqttConnection {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    stats: Arc<StatsRecorder>,
}

impl MqttConnection {
    /// Open a session and wait for the broker's acknowledgment.
    ///
    /// Spawns the event-loop task; it keeps polling (and lets rumqttc
    /// reconnect) for the life of the process.
    pub async fn connect(config: MqttConfig) -> Result<Self, MqttError> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(config.clean_session);

        if let Some(tls) = config.tls {
            options.set_transport(Transport::Tls(TlsConfiguration::Simple {
                ca: tls.ca,
                alpn: None,
                client_auth: Some((tls.client_cert, tls.client_key)),
            }));
        }

        let (client, eventloop) = AsyncClient::new(options, config.capacity);
        let connected = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(StatsRecorder::default());

        let (ack_tx, ack_rx) = oneshot::channel();
        tokio::spawn(drive_eventloop(
            eventloop,
            Arc::clone(&connected),
            Arc::clone(&stats),
            ack_tx,
        ));

        match ack_rx.await {
            Ok(Ok(())) => Ok(Self {
                client,
                connected,
                stats,
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(MqttError::ConnectionClosed),
        }
    }

    /// Tear the session down.
    ///
    /// Present in the interface but unused by the device flow, which leaves
    /// the connection open at exit.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client
            .disconnect()
            .await
            .map_err(MqttError::Disconnect)
    }
}

#[async_trait]
impl AsyncConnector for MqttConnection {
    type Error = MqttError;

    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), MqttError> {
        match self
            .client
            .publish(topic, map_qos(qos), false, payload.to_vec())
            .await
        {
            Ok(()) => {
                self.stats.record_sent(payload.len());
                Ok(())
            }
            Err(err) => {
                self.stats.record_failure(&err);
                Err(MqttError::Publish(err))
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.snapshot()
    }
}

fn map_qos(qos: QoS) -> rumqttc::QoS {
    match qos {
        QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
        QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
        QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
    }
}

/// Poll the event loop for the life of the session.
///
/// The first ConnAck (or the first error before it) resolves `ack`. After
/// a session is up, errors flip the connected flag and polling continues;
/// rumqttc re-establishes the transport on its own schedule.
async fn drive_eventloop(
    mut eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    stats: Arc<StatsRecorder>,
    ack: oneshot::Sender<Result<(), MqttError>>,
) {
    let mut ack = Some(ack);
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                debug!("broker acknowledged session");
                connected.store(true, Ordering::SeqCst);
                match ack.take() {
                    Some(tx) => {
                        let _ = tx.send(Ok(()));
                    }
                    None => stats.record_reconnection(),
                }
            }
            Ok(_) => {}
            Err(err) => {
                connected.store(false, Ordering::SeqCst);
                stats.record_failure(&err);
                if let Some(tx) = ack.take() {
                    let _ = tx.send(Err(MqttError::Connect(err)));
                    return;
                }
                warn!("mqtt event loop error: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
