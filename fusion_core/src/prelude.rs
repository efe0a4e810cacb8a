// fusion_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::estimation::{ProcessOutcome, StateEstimator};
pub use crate::messages::{Estimate, MeasurementData, MeasurementMessage, SensorKind};

// --- Configuration and Errors ---
pub use crate::config::{CovarianceUpdate, FusionConfig};
pub use crate::error::FusionError;

// --- Estimation Algorithms ---
pub use crate::estimation::filters::kalman::{KalmanFilter, UpdateOutcome};
pub use crate::estimation::fusion::FusionEkf;

// --- Concrete Models ---
pub use crate::models::dynamics::ConstantVelocityModel;
pub use crate::models::measurement::{CartesianSensor, PolarSensor, SensorModel};

// --- Core Type Aliases ---
pub use crate::types::{StateCovariance, StateVector, STATE_DIM};
