// fusion_core/src/models/measurement/polar.rs

//! Polar sensor model: `z = h(x) = [range, bearing, range_rate]`.
//!
//! `h` is nonlinear in the state, so the filter folds these readings in
//! through the Jacobian `H = ∂h/∂x` evaluated at the predicted state.

use nalgebra::Vector2;

use crate::error::FusionError;
use crate::types::{PolarJacobian, PolarMeasurement, PolarNoise, StateVector};

/// Predicted ranges below this are treated as "target at the sensor".
pub const MIN_RANGE: f64 = 1e-4;

/// Below this value of px² + py² the Jacobian is not evaluated.
pub const MIN_RANGE_SQUARED: f64 = 1e-4;

/// The polar sensor's constant parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarSensor {
    /// The 3x3 measurement noise covariance matrix, R.
    pub noise_covariance: PolarNoise,
}

impl PolarSensor {
    pub fn new(noise_covariance: PolarNoise) -> Self {
        Self { noise_covariance }
    }
}

/// Computes the ideal reading `h(x)` for a state.
///
/// Returns `None` when the predicted range is below [`MIN_RANGE`], where the
/// range-rate term would divide by zero.
pub fn predict_measurement(x: &StateVector) -> Option<PolarMeasurement> {
    let (px, py, vx, vy) = (x[0], x[1], x[2], x[3]);

    let range = (px * px + py * py).sqrt();
    if range.abs() < MIN_RANGE {
        return None;
    }
    let bearing = py.atan2(px);
    let range_rate = (px * vx + py * vy) / range;

    Some(PolarMeasurement::new(range, bearing, range_rate))
}

/// Computes the 3x4 Jacobian of `h` with respect to `[px, py, vx, vy]`.
///
/// The closed form carries 1/ρ, 1/ρ² and 1/ρ³ terms, so a state at the
/// origin yields [`FusionError::DegenerateRange`] rather than NaNs.
pub fn calculate_jacobian(x: &StateVector) -> Result<PolarJacobian, FusionError> {
    let (px, py, vx, vy) = (x[0], x[1], x[2], x[3]);

    let c1 = px * px + py * py;
    if c1 < MIN_RANGE_SQUARED {
        return Err(FusionError::DegenerateRange { range_squared: c1 });
    }
    let c2 = c1.sqrt();
    let c3 = c1 * c2;

    #[rustfmt::skip]
    let h_jac = PolarJacobian::new(
        px / c2,                         py / c2,                         0.0,     0.0,
        -py / c1,                        px / c1,                         0.0,     0.0,
        py * (vx * py - vy * px) / c3,   px * (vy * px - vx * py) / c3,   px / c2, py / c2,
    );
    Ok(h_jac)
}

/// Converts a (range, bearing) pair to a Cartesian position.
pub fn polar_to_cartesian(range: f64, bearing: f64) -> Vector2<f64> {
    Vector2::new(range * bearing.cos(), range * bearing.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn predicts_range_bearing_and_range_rate() {
        let x = StateVector::new(3.0, 4.0, 1.0, 2.0);
        let z = predict_measurement(&x).unwrap();
        assert_relative_eq!(z[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(z[1], 4.0_f64.atan2(3.0), epsilon = 1e-12);
        assert_relative_eq!(z[2], (3.0 + 8.0) / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn prediction_at_origin_is_undefined() {
        assert!(predict_measurement(&StateVector::new(0.0, 0.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn jacobian_matches_known_values() {
        let x = StateVector::new(1.0, 2.0, 0.2, 0.4);
        let h = calculate_jacobian(&x).unwrap();

        let c1: f64 = 5.0;
        let c2 = c1.sqrt();
        let c3 = c1 * c2;
        #[rustfmt::skip]
        let expected = PolarJacobian::new(
            1.0 / c2,                          2.0 / c2,                          0.0,      0.0,
            -2.0 / c1,                         1.0 / c1,                          0.0,      0.0,
            2.0 * (0.2 * 2.0 - 0.4 * 1.0) / c3, 1.0 * (0.4 * 1.0 - 0.2 * 2.0) / c3, 1.0 / c2, 2.0 / c2,
        );
        assert_relative_eq!(h, expected, epsilon = 1e-12);
    }

    #[test]
    fn jacobian_agrees_with_finite_differences() {
        let x = StateVector::new(-2.5, 1.3, 0.7, -1.1);
        let h = calculate_jacobian(&x).unwrap();
        let z0 = predict_measurement(&x).unwrap();

        let epsilon = 1e-7;
        for j in 0..4 {
            let mut perturbed = x;
            perturbed[j] += epsilon;
            let z1 = predict_measurement(&perturbed).unwrap();
            let column = (z1 - z0) / epsilon;
            for i in 0..3 {
                assert_relative_eq!(h[(i, j)], column[i], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn jacobian_at_origin_is_a_domain_error() {
        let err = calculate_jacobian(&StateVector::new(0.0, 0.0, 3.0, 4.0)).unwrap_err();
        assert!(matches!(err, FusionError::DegenerateRange { range_squared } if range_squared == 0.0));
    }

    #[test]
    fn converts_polar_to_cartesian() {
        assert_relative_eq!(polar_to_cartesian(1.0, 0.0), Vector2::new(1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(polar_to_cartesian(2.0, FRAC_PI_2), Vector2::new(0.0, 2.0), epsilon = 1e-12);
    }
}
