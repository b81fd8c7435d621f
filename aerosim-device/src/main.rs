//! Simulated air-purifier device
//!
//! Connects to the broker once (mutual TLS when certificate material is
//! configured), runs a bounded telemetry run to completion and exits,
//! leaving the connection open.
//!
//! Configuration is environment-driven:
//!
//! | Variable              | Default                           |
//! |-----------------------|-----------------------------------|
//! | `AEROSIM_HOST`        | `localhost`                       |
//! | `AEROSIM_PORT`        | 8883 with TLS, 1883 without       |
//! | `AEROSIM_CLIENT_ID`   | `aerosim-<random>`                |
//! | `AEROSIM_CA_FILE`     | — (plain TCP when unset)          |
//! | `AEROSIM_CERT_FILE`   | — (set together with CA and key)  |
//! | `AEROSIM_KEY_FILE`    | —                                 |
//! | `AEROSIM_TOPIC`       | the schema version's topic        |
//! | `AEROSIM_SCHEMA`      | `v1`                              |
//! | `AEROSIM_COUNT`       | 10                                |
//! | `AEROSIM_INTERVAL_MS` | 1000                              |
//! | `AEROSIM_SEED`        | — (entropy-seeded when unset)     |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use aerosim_connectors::{
    AsyncConnector, MqttConfig, MqttConnection, MqttError, TelemetryPublisher, TlsIdentity,
};
use aerosim_core::{
    ConfigError, GeneratorConfig, PublishSchedule, SampleGenerator, SampleValidator,
    SchemaVersion, SystemClock,
};

#[derive(Debug, Error)]
enum SetupError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("mutual TLS needs AEROSIM_CA_FILE, AEROSIM_CERT_FILE and AEROSIM_KEY_FILE together")]
    PartialTls,

    #[error("failed to read {path}: {source}")]
    ReadPem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mqtt(#[from] MqttError),
}

struct DeviceConfig {
    mqtt: MqttConfig,
    topic: Option<String>,
    schema: SchemaVersion,
    count: u32,
    interval: Duration,
    seed: Option<u64>,
}

impl DeviceConfig {
    fn from_env() -> Result<Self, SetupError> {
        let tls = load_tls()?;
        let default_port = if tls.is_some() { 8883 } else { 1883 };

        let schema = match var("AEROSIM_SCHEMA") {
            None => SchemaVersion::default(),
            Some(raw) => SchemaVersion::parse(&raw).ok_or(SetupError::InvalidVar {
                var: "AEROSIM_SCHEMA",
                value: raw,
            })?,
        };

        let mqtt = MqttConfig {
            client_id: var("AEROSIM_CLIENT_ID")
                .unwrap_or_else(|| format!("aerosim-{:08x}", rand::thread_rng().gen::<u32>())),
            host: var("AEROSIM_HOST").unwrap_or_else(|| "localhost".into()),
            port: parsed("AEROSIM_PORT", default_port)?,
            tls,
            ..MqttConfig::default()
        };

        Ok(Self {
            mqtt,
            topic: var("AEROSIM_TOPIC"),
            schema,
            count: parsed("AEROSIM_COUNT", 10)?,
            interval: Duration::from_millis(parsed("AEROSIM_INTERVAL_MS", 1_000)?),
            seed: var("AEROSIM_SEED")
                .map(|raw| {
                    raw.parse().map_err(|_| SetupError::InvalidVar {
                        var: "AEROSIM_SEED",
                        value: raw,
                    })
                })
                .transpose()?,
        })
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, SetupError> {
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| SetupError::InvalidVar { var: name, value: raw }),
    }
}

fn load_tls() -> Result<Option<TlsIdentity>, SetupError> {
    let ca = var("AEROSIM_CA_FILE");
    let cert = var("AEROSIM_CERT_FILE");
    let key = var("AEROSIM_KEY_FILE");

    match (ca, cert, key) {
        (None, None, None) => Ok(None),
        (Some(ca), Some(cert), Some(key)) => Ok(Some(TlsIdentity {
            ca: read_pem(ca)?,
            client_cert: read_pem(cert)?,
            client_key: read_pem(key)?,
        })),
        _ => Err(SetupError::PartialTls),
    }
}

fn read_pem(path: String) -> Result<Vec<u8>, SetupError> {
    let path = PathBuf::from(path);
    std::fs::read(&path).map_err(|source| SetupError::ReadPem { path, source })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Single catch-and-log boundary; nothing below it retries
    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SetupError> {
    let config = DeviceConfig::from_env()?;

    info!("Connecting...");
    let connection = Arc::new(MqttConnection::connect(config.mqtt).await?);
    info!("Connected!");

    let generator_config = GeneratorConfig::air_purifier();
    let validator = SampleValidator::for_config(&generator_config);
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = SampleGenerator::new(generator_config, rng)?;

    let topic = config
        .topic
        .unwrap_or_else(|| config.schema.default_topic().to_string());
    let publisher = TelemetryPublisher::new(Arc::clone(&connection), topic, config.schema)
        .with_validator(validator);

    let schedule = PublishSchedule::new(config.count, config.interval);
    let outcomes = publisher
        .run(schedule, generator, Arc::new(SystemClock))
        .join_all()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    let stats = connection.stats();
    info!(
        "run finished: {} published, {} failed, {} bytes",
        stats.messages_sent, failed, stats.bytes_sent
    );

    // The connection stays open at exit; the broker reaps the session
    Ok(())
}
