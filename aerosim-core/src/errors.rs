//! Error types for sample generation and validation
//!
//! Two families: [`ConfigError`] for preconditions caught before a run is
//! scheduled, [`ValidationError`] for individual readings that fall outside
//! their documented ranges. Validation errors carry the offending field and
//! bounds so a failed sample can be reported without further queries.

use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A reading failed validation against its documented range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value outside the configured bounds for its field.
    #[error("{field} value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// Wire name of the failing field
        field: &'static str,
        /// The offending value
        value: f64,
        /// Lower inclusive bound
        min: f64,
        /// Upper inclusive bound
        max: f64,
    },

    /// Device identifier is not in the configured pool.
    #[error("device id not in configured pool")]
    UnknownDevice,

    /// Value is NaN or infinite.
    #[error("invalid value: not a finite number")]
    InvalidValue,
}

/// Generator or schedule configuration rejected before any tick fires.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The device identifier pool must hold at least one entry.
    #[error("device id pool is empty")]
    EmptyDevicePool,

    /// Anomaly probability must lie in [0, 1].
    #[error("anomaly probability {0} outside [0, 1]")]
    ProbabilityOutOfRange(f64),

    /// A reading range has min above max.
    #[error("{field} range inverted: min {min} > max {max}")]
    InvertedRange {
        /// Wire name of the misconfigured field
        field: &'static str,
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },
}
