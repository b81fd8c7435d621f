//! The unit of published telemetry
//!
//! One [`SensorSample`] is created per scheduled tick, serialized
//! immediately and handed to the connector. It is never retained, mutated
//! after creation, or reused.

use crate::time::Timestamp;

/// A single synthetic purifier reading.
///
/// Field ranges are documented in [`crate::constants`]; all numeric fields
/// are drawn independently per sample, with no cross-field correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    /// Identifier of the unit this reading is attributed to.
    pub device_id: String,
    /// Whole epoch seconds at generation time.
    pub timestamp: Timestamp,
    /// Ambient temperature (°C); anomalous samples are inflated by a fixed
    /// factor but share the same base draw as healthy ones.
    pub temperature: f64,
    /// Air quality index.
    pub aqi: u16,
    /// Relative humidity (%).
    pub humidity: u8,
    /// Fan speed step.
    pub fan_level: u8,
    /// Purified air volume since the last report (litres).
    pub purified_volume: u32,
}
