//! Range validation for generated and decoded samples
//!
//! The loose structural payloads of the original device scripts are
//! replaced by an explicit record type plus this validator, which checks
//! every reading against the documented ranges. The temperature bound is
//! widened by the anomaly factor: an injected fault is a legitimate sample,
//! not a wire error.

use crate::{
    errors::{ValidationError, ValidationResult},
    generator::GeneratorConfig,
    sample::SensorSample,
};

/// Check one value against an inclusive range.
pub fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> ValidationResult<()> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validates samples against the ranges of a [`GeneratorConfig`].
#[derive(Debug, Clone)]
pub struct SampleValidator {
    device_pool: Vec<String>,
    temperature_c: (f64, f64),
    aqi: (u16, u16),
    humidity_pct: (u8, u8),
    fan_level: (u8, u8),
    purified_volume_l: (u32, u32),
}

impl SampleValidator {
    /// Derive the acceptable ranges from a generator configuration.
    pub fn for_config(config: &GeneratorConfig) -> Self {
        let (min, max) = config.temperature_c;
        let factor = config.anomaly_factor;
        // Anomalous readings are base-draw multiples, so the acceptable
        // envelope covers both the plain and the inflated range.
        let temperature_c = (
            min.min(min * factor),
            max.max(max * factor),
        );

        Self {
            device_pool: config.device_pool.clone(),
            temperature_c,
            aqi: config.aqi,
            humidity_pct: config.humidity_pct,
            fan_level: config.fan_level,
            purified_volume_l: config.purified_volume_l,
        }
    }

    /// Check every field of `sample` against its documented range.
    pub fn validate(&self, sample: &SensorSample) -> ValidationResult<()> {
        if !sample.temperature.is_finite() {
            return Err(ValidationError::InvalidValue);
        }

        if !self.device_pool.iter().any(|id| id == &sample.device_id) {
            return Err(ValidationError::UnknownDevice);
        }

        check_range(
            "temperature",
            sample.temperature,
            self.temperature_c.0,
            self.temperature_c.1,
        )?;
        check_range("aqi", sample.aqi as f64, self.aqi.0 as f64, self.aqi.1 as f64)?;
        check_range(
            "humidity",
            sample.humidity as f64,
            self.humidity_pct.0 as f64,
            self.humidity_pct.1 as f64,
        )?;
        check_range(
            "fan_level",
            sample.fan_level as f64,
            self.fan_level.0 as f64,
            self.fan_level.1 as f64,
        )?;
        check_range(
            "purify_volume",
            sample.purified_volume as f64,
            self.purified_volume_l.0 as f64,
            self.purified_volume_l.1 as f64,
        )?;

        Ok(())
    }
}
