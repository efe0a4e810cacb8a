// fusion_core/src/messages.rs

use std::fmt;

use crate::error::FusionError;
use crate::types::{CartesianMeasurement, PolarMeasurement, StateCovariance};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Sensor Tags ==
// =========================================================================

/// Which sensor produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Linear sensor reporting `[px, py]`.
    Cartesian,
    /// Nonlinear sensor reporting `[range, bearing, range_rate]`.
    Polar,
}

impl SensorKind {
    /// Number of components in a raw reading from this sensor.
    pub const fn measurement_dim(self) -> usize {
        match self {
            SensorKind::Cartesian => 2,
            SensorKind::Polar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Cartesian => write!(f, "cartesian"),
            SensorKind::Polar => write!(f, "polar"),
        }
    }
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// A raw sensor reading. The variant fixes the dimension of the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementData {
    Cartesian(CartesianMeasurement),
    Polar(PolarMeasurement),
}

impl MeasurementData {
    pub fn kind(&self) -> SensorKind {
        match self {
            MeasurementData::Cartesian(_) => SensorKind::Cartesian,
            MeasurementData::Polar(_) => SensorKind::Polar,
        }
    }

    /// True when every component of the reading is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            MeasurementData::Cartesian(z) => z.iter().all(|v| v.is_finite()),
            MeasurementData::Polar(z) => z.iter().all(|v| v.is_finite()),
        }
    }
}

/// The message a driver hands to the filter for every reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMessage {
    /// Measurement time in microseconds.
    pub timestamp: u64,
    pub data: MeasurementData,
}

impl MeasurementMessage {
    pub fn cartesian(px: f64, py: f64, timestamp: u64) -> Self {
        Self {
            timestamp,
            data: MeasurementData::Cartesian(CartesianMeasurement::new(px, py)),
        }
    }

    pub fn polar(range: f64, bearing: f64, range_rate: f64, timestamp: u64) -> Self {
        Self {
            timestamp,
            data: MeasurementData::Polar(PolarMeasurement::new(range, bearing, range_rate)),
        }
    }

    /// Builds a message from an untyped slice, e.g. a parsed log line.
    ///
    /// The slice must hold exactly as many finite values as the sensor reports.
    pub fn from_raw(sensor: SensorKind, raw: &[f64], timestamp: u64) -> Result<Self, FusionError> {
        let expected = sensor.measurement_dim();
        if raw.len() != expected {
            return Err(FusionError::DimensionMismatch {
                sensor,
                expected,
                actual: raw.len(),
            });
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(FusionError::NonFiniteMeasurement { sensor });
        }

        let data = match sensor {
            SensorKind::Cartesian => {
                MeasurementData::Cartesian(CartesianMeasurement::from_column_slice(raw))
            }
            SensorKind::Polar => MeasurementData::Polar(PolarMeasurement::from_column_slice(raw)),
        };
        Ok(Self { timestamp, data })
    }

    pub fn kind(&self) -> SensorKind {
        self.data.kind()
    }
}

// =========================================================================
// == Public API Messages ==
// =========================================================================

/// Snapshot of the filter output after a `process` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    /// Timestamp (microseconds) of the last measurement folded into the state.
    pub timestamp: u64,
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub covariance: StateCovariance,
}
