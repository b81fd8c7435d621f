//! Constants for aerosim sample generation
//!
//! Default ranges for every simulated reading, matching the telemetry the
//! managed analytics pipeline was provisioned for. All ranges are inclusive
//! on both ends; units are part of the constant name.

// ===== TEMPERATURE =====

/// Minimum ambient temperature drawn for a healthy purifier (°C).
pub const TEMP_AMBIENT_MIN_C: f64 = 15.0;

/// Maximum ambient temperature drawn for a healthy purifier (°C).
pub const TEMP_AMBIENT_MAX_C: f64 = 35.0;

// ===== ANOMALY INJECTION =====

/// Fraction of samples whose temperature is inflated to simulate a sensor
/// fault. Injected independently per sample, never correlated across time
/// or device.
pub const ANOMALY_PROBABILITY: f64 = 0.03;

/// Multiplier applied to the base temperature draw of an anomalous sample.
pub const ANOMALY_FACTOR: f64 = 3.0;

// ===== OTHER READINGS =====

/// Minimum air quality index reported by the purifier's particulate sensor.
pub const AQI_MIN: u16 = 10;

/// Maximum air quality index reported by the purifier's particulate sensor.
pub const AQI_MAX: u16 = 180;

/// Minimum relative humidity (%).
pub const HUMIDITY_MIN_PCT: u8 = 30;

/// Maximum relative humidity (%).
pub const HUMIDITY_MAX_PCT: u8 = 70;

/// Lowest fan speed step.
pub const FAN_LEVEL_MIN: u8 = 1;

/// Highest fan speed step.
pub const FAN_LEVEL_MAX: u8 = 5;

/// Minimum purified air volume since the last report (litres).
pub const PURIFIED_VOLUME_MIN_L: u32 = 100;

/// Maximum purified air volume since the last report (litres).
pub const PURIFIED_VOLUME_MAX_L: u32 = 500;

// ===== DEVICES =====

/// Identifier pool for the simulated fleet. Several physical units share
/// one logical telemetry stream, so each sample picks one uniformly.
pub const DEVICE_ID_POOL: &[&str] = &[
    "air-purifier-001",
    "air-purifier-002",
    "air-purifier-003",
];
