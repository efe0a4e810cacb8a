// fusion_core/src/models/measurement/mod.rs

use tracing::warn;

use crate::error::FusionError;
use crate::estimation::filters::kalman::{KalmanFilter, UpdateOutcome};
use crate::messages::{MeasurementData, SensorKind};

pub mod cartesian;
pub mod polar;

pub use cartesian::CartesianSensor;
pub use polar::PolarSensor;

// --- MEASUREMENT MODEL ---
// The two sensors are a closed set, so they are an enum rather than trait
// objects. Each variant carries its own constant H and/or R.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorModel {
    /// Linear model with a fixed H.
    Cartesian(CartesianSensor),
    /// Nonlinear model; H is the Jacobian at the predicted state.
    Polar(PolarSensor),
}

impl SensorModel {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorModel::Cartesian(_) => SensorKind::Cartesian,
            SensorModel::Polar(_) => SensorKind::Polar,
        }
    }

    /// Folds a reading into `filter`, which must already hold the predicted
    /// state for the reading's timestamp.
    ///
    /// A polar reading whose predicted position sits at the sensor origin is
    /// skipped and the filter is left untouched.
    pub fn apply(
        &self,
        filter: &mut KalmanFilter,
        data: &MeasurementData,
    ) -> Result<UpdateOutcome, FusionError> {
        match (self, data) {
            (SensorModel::Cartesian(sensor), MeasurementData::Cartesian(z)) => {
                filter.update(z, &sensor.measurement_matrix, &sensor.noise_covariance)?;
                Ok(UpdateOutcome::Applied)
            }
            (SensorModel::Polar(sensor), MeasurementData::Polar(z)) => {
                let h_jac = match polar::calculate_jacobian(filter.state()) {
                    Ok(h_jac) => h_jac,
                    Err(FusionError::DegenerateRange { range_squared }) => {
                        warn!(
                            range_squared,
                            "Predicted position is at the polar sensor origin; skipping update"
                        );
                        return Ok(UpdateOutcome::Skipped);
                    }
                    Err(err) => return Err(err),
                };
                filter.update_polar(z, &h_jac, &sensor.noise_covariance)
            }
            (model, data) => Err(FusionError::SensorMismatch {
                model: model.kind(),
                data: data.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartesianNoise, PolarMeasurement, PolarNoise, StateCovariance, StateVector};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector2};

    fn filter_at(x: StateVector) -> KalmanFilter {
        KalmanFilter::new(
            x,
            StateCovariance::identity(),
            Matrix4::identity(),
            Matrix4::zeros(),
        )
    }

    #[test]
    fn cartesian_model_pulls_position_towards_reading() {
        let model = SensorModel::Cartesian(CartesianSensor::new(CartesianNoise::identity()));
        let mut filter = filter_at(StateVector::zeros());

        let outcome = model
            .apply(&mut filter, &MeasurementData::Cartesian(Vector2::new(2.0, -2.0)))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Applied);
        // Equal prior and measurement variances: the estimate lands halfway.
        assert_relative_eq!(filter.state()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(filter.state()[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn polar_model_skips_at_origin() {
        let model = SensorModel::Polar(PolarSensor::new(PolarNoise::identity()));
        let mut filter = filter_at(StateVector::zeros());
        let before = filter.clone();

        let outcome = model
            .apply(&mut filter, &MeasurementData::Polar(PolarMeasurement::new(1.0, 0.1, 0.0)))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Skipped);
        assert_eq!(filter, before);
    }

    #[test]
    fn mismatched_reading_is_rejected() {
        let model = SensorModel::Polar(PolarSensor::new(PolarNoise::identity()));
        let mut filter = filter_at(StateVector::new(1.0, 1.0, 0.0, 0.0));

        let err = model
            .apply(&mut filter, &MeasurementData::Cartesian(Vector2::new(1.0, 1.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            FusionError::SensorMismatch {
                model: SensorKind::Polar,
                data: SensorKind::Cartesian
            }
        ));
    }
}
