//! Core library for the aerosim air-purifier telemetry simulator
//!
//! Generates synthetic device-state samples with probabilistic anomaly
//! injection and plans their publication on a fixed cadence. Transport
//! lives in `aerosim-connectors`; this crate is runtime-agnostic.
//!
//! Key properties:
//! - Randomness is injected (any [`rand::Rng`]), so runs are seedable
//! - Every reading is drawn independently from a bounded range
//! - Generated samples round-trip losslessly through the wire formats
//!
//! ```
//! use aerosim_core::{GeneratorConfig, SampleGenerator};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut gen = SampleGenerator::new(
//!     GeneratorConfig::air_purifier(),
//!     StdRng::seed_from_u64(7),
//! ).unwrap();
//!
//! let sample = gen.next_sample(1_700_000_000);
//! assert!(sample.temperature >= 15.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod errors;
pub mod generator;
pub mod sample;
pub mod schedule;
pub mod time;
pub mod validators;
pub mod wire;

// Public API
pub use errors::{ConfigError, ValidationError, ValidationResult};
pub use generator::{GeneratorConfig, SampleGenerator};
pub use sample::SensorSample;
pub use schedule::{PublishSchedule, Tick};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};
pub use validators::SampleValidator;
pub use wire::SchemaVersion;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
