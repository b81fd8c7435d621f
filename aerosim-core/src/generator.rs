//! Synthetic sample generation with anomaly injection
//!
//! One generator produces the whole run's samples from an injected RNG, so
//! a seeded run is fully deterministic. Draw order per sample is fixed:
//! device id, base temperature, anomaly coin, then the remaining readings.
//! Reordering the draws changes every seeded sequence.

use rand::Rng;

use crate::{
    constants,
    errors::ConfigError,
    sample::SensorSample,
    time::Timestamp,
};

/// Bounds and probabilities for sample generation.
///
/// All ranges are inclusive. Construct with [`GeneratorConfig::air_purifier`]
/// and adjust fields as needed; [`validate`](GeneratorConfig::validate) runs
/// when the generator is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Identifier pool; each sample picks one uniformly.
    pub device_pool: Vec<String>,
    /// Ambient temperature range (°C) for the base draw.
    pub temperature_c: (f64, f64),
    /// Per-sample probability of inflating the temperature.
    pub anomaly_probability: f64,
    /// Multiplier applied to the base draw of an anomalous sample.
    pub anomaly_factor: f64,
    /// Air quality index range.
    pub aqi: (u16, u16),
    /// Relative humidity range (%).
    pub humidity_pct: (u8, u8),
    /// Fan speed step range.
    pub fan_level: (u8, u8),
    /// Purified volume range (litres).
    pub purified_volume_l: (u32, u32),
}

impl GeneratorConfig {
    /// Defaults matching the provisioned analytics pipeline.
    pub fn air_purifier() -> Self {
        Self {
            device_pool: constants::DEVICE_ID_POOL
                .iter()
                .map(|id| id.to_string())
                .collect(),
            temperature_c: (constants::TEMP_AMBIENT_MIN_C, constants::TEMP_AMBIENT_MAX_C),
            anomaly_probability: constants::ANOMALY_PROBABILITY,
            anomaly_factor: constants::ANOMALY_FACTOR,
            aqi: (constants::AQI_MIN, constants::AQI_MAX),
            humidity_pct: (constants::HUMIDITY_MIN_PCT, constants::HUMIDITY_MAX_PCT),
            fan_level: (constants::FAN_LEVEL_MIN, constants::FAN_LEVEL_MAX),
            purified_volume_l: (
                constants::PURIFIED_VOLUME_MIN_L,
                constants::PURIFIED_VOLUME_MAX_L,
            ),
        }
    }

    /// Check the preconditions the generator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_pool.is_empty() {
            return Err(ConfigError::EmptyDevicePool);
        }
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(ConfigError::ProbabilityOutOfRange(self.anomaly_probability));
        }

        check_ordered("temperature", self.temperature_c.0, self.temperature_c.1)?;
        check_ordered("aqi", self.aqi.0 as f64, self.aqi.1 as f64)?;
        check_ordered("humidity", self.humidity_pct.0 as f64, self.humidity_pct.1 as f64)?;
        check_ordered("fan_level", self.fan_level.0 as f64, self.fan_level.1 as f64)?;
        check_ordered(
            "purify_volume",
            self.purified_volume_l.0 as f64,
            self.purified_volume_l.1 as f64,
        )?;

        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::air_purifier()
    }
}

fn check_ordered(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

/// Produces one [`SensorSample`] per tick from an injected RNG.
#[derive(Debug)]
pub struct SampleGenerator<R: Rng> {
    config: GeneratorConfig,
    rng: R,
}

impl<R: Rng> SampleGenerator<R> {
    /// Build a generator, rejecting invalid configuration up front.
    pub fn new(config: GeneratorConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// The configuration this generator draws from.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw the next sample, stamped with `timestamp`.
    ///
    /// Generation cannot fail: every field is pure arithmetic over the
    /// validated ranges. Anomalous and healthy samples share the same base
    /// temperature draw; the anomaly only multiplies it.
    pub fn next_sample(&mut self, timestamp: Timestamp) -> SensorSample {
        let cfg = &self.config;

        let device_id = cfg.device_pool[self.rng.gen_range(0..cfg.device_pool.len())].clone();

        let base = self.rng.gen_range(cfg.temperature_c.0..=cfg.temperature_c.1);
        let temperature = if self.rng.gen_bool(cfg.anomaly_probability) {
            log::debug!("injecting temperature anomaly for {device_id}");
            base * cfg.anomaly_factor
        } else {
            base
        };

        SensorSample {
            device_id,
            timestamp,
            temperature,
            aqi: self.rng.gen_range(cfg.aqi.0..=cfg.aqi.1),
            humidity: self.rng.gen_range(cfg.humidity_pct.0..=cfg.humidity_pct.1),
            fan_level: self.rng.gen_range(cfg.fan_level.0..=cfg.fan_level.1),
            purified_volume: self
                .rng
                .gen_range(cfg.purified_volume_l.0..=cfg.purified_volume_l.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn generator(config: GeneratorConfig, seed: u64) -> SampleGenerator<StdRng> {
        SampleGenerator::new(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn device_id_always_from_pool() {
        let mut gen = generator(GeneratorConfig::air_purifier(), 1);
        for _ in 0..200 {
            let sample = gen.next_sample(0);
            assert!(constants::DEVICE_ID_POOL.contains(&sample.device_id.as_str()));
        }
    }

    #[test]
    fn never_anomalous_at_probability_zero() {
        let config = GeneratorConfig {
            anomaly_probability: 0.0,
            ..GeneratorConfig::air_purifier()
        };
        let mut gen = generator(config, 2);
        for _ in 0..500 {
            let sample = gen.next_sample(0);
            assert!(sample.temperature >= constants::TEMP_AMBIENT_MIN_C);
            assert!(sample.temperature <= constants::TEMP_AMBIENT_MAX_C);
        }
    }

    #[test]
    fn always_anomalous_at_probability_one() {
        let config = GeneratorConfig {
            anomaly_probability: 1.0,
            ..GeneratorConfig::air_purifier()
        };
        let mut gen = generator(config, 3);
        for _ in 0..500 {
            let sample = gen.next_sample(0);
            // Dividing out the factor must land back in the base range
            let base = sample.temperature / constants::ANOMALY_FACTOR;
            assert!(base >= constants::TEMP_AMBIENT_MIN_C);
            assert!(base <= constants::TEMP_AMBIENT_MAX_C);
        }
    }

    #[test]
    fn anomaly_multiplies_the_same_base_draw() {
        // Device and base-temperature draws happen before the anomaly coin,
        // so two generators on the same seed share them exactly.
        let healthy = GeneratorConfig {
            anomaly_probability: 0.0,
            ..GeneratorConfig::air_purifier()
        };
        let faulty = GeneratorConfig {
            anomaly_probability: 1.0,
            ..GeneratorConfig::air_purifier()
        };

        let mut gen_healthy = generator(healthy, 42);
        let mut gen_faulty = generator(faulty, 42);

        let a = gen_healthy.next_sample(0);
        let b = gen_faulty.next_sample(0);
        assert_eq!(a.device_id, b.device_id);
        assert_eq!(b.temperature, a.temperature * constants::ANOMALY_FACTOR);
    }

    #[test]
    fn empty_pool_rejected() {
        let config = GeneratorConfig {
            device_pool: Vec::new(),
            ..GeneratorConfig::air_purifier()
        };
        assert_eq!(
            SampleGenerator::new(config, StdRng::seed_from_u64(0)).err(),
            Some(ConfigError::EmptyDevicePool)
        );
    }

    #[test]
    fn out_of_unit_probability_rejected() {
        let config = GeneratorConfig {
            anomaly_probability: 1.5,
            ..GeneratorConfig::air_purifier()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange(_))
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        let config = GeneratorConfig {
            temperature_c: (35.0, 15.0),
            ..GeneratorConfig::air_purifier()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { field: "temperature", .. })
        ));
    }
}
