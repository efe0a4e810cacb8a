// fusion_core/src/error.rs

use crate::messages::SensorKind;
use thiserror::Error;

/// Everything that can go wrong while configuring or running the filter.
///
/// A polar update at (or extremely near) the sensor origin is *not* an error;
/// it is reported as a skipped update instead.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("innovation covariance S is singular; the update cannot be applied")]
    SingularInnovationCovariance,

    #[error("polar Jacobian is undefined at the sensor origin (px^2 + py^2 = {range_squared:e})")]
    DegenerateRange { range_squared: f64 },

    #[error("{sensor} measurement expects {expected} components, got {actual}")]
    DimensionMismatch {
        sensor: SensorKind,
        expected: usize,
        actual: usize,
    },

    #[error("{sensor} measurement contains a non-finite component")]
    NonFiniteMeasurement { sensor: SensorKind },

    #[error("a {model} sensor model cannot fold in a {data} measurement")]
    SensorMismatch { model: SensorKind, data: SensorKind },

    #[error("timestamp {current} us is earlier than the previous measurement at {previous} us")]
    NonMonotonicTimestamp { previous: u64, current: u64 },

    #[error("invalid filter configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load filter configuration: {0}")]
    Config(#[source] Box<figment::Error>),
}

impl From<figment::Error> for FusionError {
    fn from(err: figment::Error) -> Self {
        FusionError::Config(Box::new(err))
    }
}
