// fusion_core/src/estimation/fusion.rs

use tracing::{debug, info};

use crate::config::{CovarianceUpdate, FusionConfig};
use crate::error::FusionError;
use crate::estimation::filters::kalman::{KalmanFilter, UpdateOutcome};
use crate::estimation::{ProcessOutcome, StateEstimator};
use crate::messages::{Estimate, MeasurementData, MeasurementMessage};
use crate::models::dynamics::ConstantVelocityModel;
use crate::models::measurement::{polar, CartesianSensor, PolarSensor, SensorModel};
use crate::types::{ProcessNoise, StateCovariance, StateVector, MICROS_PER_SECOND};

/// Step length baked into F before the first real Δt is known.
const STARTUP_DT: f64 = 1.0;

/// Fuses Cartesian and polar readings of one target into a constant-velocity
/// state estimate.
///
/// The first reading of a session only seeds the position. Every later reading
/// runs one predict over the elapsed time followed by one update with the
/// model of the sensor that produced it.
#[derive(Debug, Clone)]
pub struct FusionEkf {
    /// The estimator core holding x, P, F and Q.
    ekf: KalmanFilter,
    /// Builds F and Q for each step.
    motion: ConstantVelocityModel,
    cartesian_model: SensorModel,
    polar_model: SensorModel,
    /// P assigned at startup and on reset.
    initial_covariance: StateCovariance,
    covariance_update: CovarianceUpdate,
    is_initialized: bool,
    /// Timestamp (microseconds) of the last reading folded in.
    previous_timestamp: u64,
}

impl FusionEkf {
    /// Creates a filter from a configuration, rejecting invalid variances.
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        config.validate()?;
        Ok(Self::from_validated(&config))
    }

    fn from_validated(config: &FusionConfig) -> Self {
        let motion = ConstantVelocityModel::from_config(&config.process_noise);
        let initial_covariance = config.initial_covariance.covariance();
        let covariance_update = config.covariance_update;

        Self {
            ekf: Self::startup_filter(&motion, initial_covariance, covariance_update),
            motion,
            cartesian_model: SensorModel::Cartesian(CartesianSensor::new(
                config.cartesian_noise.noise_matrix(),
            )),
            polar_model: SensorModel::Polar(PolarSensor::new(config.polar_noise.noise_matrix())),
            initial_covariance,
            covariance_update,
            is_initialized: false,
            previous_timestamp: 0,
        }
    }

    fn startup_filter(
        motion: &ConstantVelocityModel,
        initial_covariance: StateCovariance,
        covariance_update: CovarianceUpdate,
    ) -> KalmanFilter {
        KalmanFilter::new(
            StateVector::zeros(),
            initial_covariance,
            motion.transition_matrix(STARTUP_DT),
            ProcessNoise::zeros(),
        )
        .with_covariance_update(covariance_update)
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Timestamp (microseconds) of the last reading folded in.
    pub fn previous_timestamp(&self) -> u64 {
        self.previous_timestamp
    }

    /// Read access to the estimator core (x, P, F, Q).
    pub fn filter(&self) -> &KalmanFilter {
        &self.ekf
    }

    /// Snapshot of the current estimate, or `None` before the first reading.
    pub fn estimate(&self) -> Option<Estimate> {
        if !self.is_initialized {
            return None;
        }
        let x = self.ekf.state();
        Some(Estimate {
            timestamp: self.previous_timestamp,
            position: x.fixed_rows::<2>(0).into_owned(),
            velocity: x.fixed_rows::<2>(2).into_owned(),
            covariance: *self.ekf.covariance(),
        })
    }

    /// Seeds the state from the first reading of a session.
    fn initialize(&mut self, message: &MeasurementMessage) {
        let position = match &message.data {
            // Range-rate is the radial component only, so it cannot seed velocity.
            MeasurementData::Polar(z) => polar::polar_to_cartesian(z[0], z[1]),
            MeasurementData::Cartesian(z) => *z,
        };
        self.ekf.set_state(StateVector::new(position[0], position[1], 0.0, 0.0));

        self.previous_timestamp = message.timestamp;
        self.is_initialized = true;
        info!(
            sensor = %message.kind(),
            timestamp = message.timestamp,
            "Initialized state at ({:.4}, {:.4})",
            position[0],
            position[1]
        );
    }
}

impl Default for FusionEkf {
    fn default() -> Self {
        Self::from_validated(&FusionConfig::default())
    }
}

impl StateEstimator for FusionEkf {
    fn process(&mut self, message: &MeasurementMessage) -> Result<ProcessOutcome, FusionError> {
        // A NaN or infinite component would poison x and P for the rest of the session.
        if !message.data.is_finite() {
            return Err(FusionError::NonFiniteMeasurement {
                sensor: message.kind(),
            });
        }

        if !self.is_initialized {
            self.initialize(message);
            return Ok(ProcessOutcome::Initialized);
        }

        // --- Prediction ---
        if message.timestamp < self.previous_timestamp {
            return Err(FusionError::NonMonotonicTimestamp {
                previous: self.previous_timestamp,
                current: message.timestamp,
            });
        }
        let dt = (message.timestamp - self.previous_timestamp) as f64 / MICROS_PER_SECOND;
        self.previous_timestamp = message.timestamp;
        debug!(dt, sensor = %message.kind(), "Processing measurement");

        ConstantVelocityModel::set_elapsed(self.ekf.transition_mut(), dt);
        self.ekf.set_process_noise(self.motion.process_noise(dt));
        self.ekf.predict();

        // --- Update ---
        let model = match &message.data {
            MeasurementData::Cartesian(_) => &self.cartesian_model,
            MeasurementData::Polar(_) => &self.polar_model,
        };
        match model.apply(&mut self.ekf, &message.data)? {
            UpdateOutcome::Applied => Ok(ProcessOutcome::Updated),
            UpdateOutcome::Skipped => Ok(ProcessOutcome::UpdateSkipped),
        }
    }

    fn state(&self) -> &StateVector {
        self.ekf.state()
    }

    fn covariance(&self) -> &StateCovariance {
        self.ekf.covariance()
    }

    fn reset(&mut self) {
        self.ekf = Self::startup_filter(&self.motion, self.initial_covariance, self.covariance_update);
        self.previous_timestamp = 0;
        self.is_initialized = false;
        info!("Filter reset to startup values");
    }
}
