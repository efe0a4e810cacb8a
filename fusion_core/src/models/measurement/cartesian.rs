// fusion_core/src/models/measurement/cartesian.rs

use crate::types::{CartesianMatrix, CartesianNoise};

/// The Cartesian position sensor: `z = H x` with a constant H that picks out
/// `[px, py]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianSensor {
    /// The 2x4 measurement matrix, H.
    pub measurement_matrix: CartesianMatrix,
    /// The 2x2 measurement noise covariance matrix, R.
    pub noise_covariance: CartesianNoise,
}

impl CartesianSensor {
    pub fn new(noise_covariance: CartesianNoise) -> Self {
        Self {
            measurement_matrix: position_selector(),
            noise_covariance,
        }
    }
}

/// `[[1, 0, 0, 0], [0, 1, 0, 0]]`
pub fn position_selector() -> CartesianMatrix {
    #[rustfmt::skip]
    let h = CartesianMatrix::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
    );
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateVector;
    use nalgebra::Vector2;

    #[test]
    fn selects_position_components() {
        let sensor = CartesianSensor::new(CartesianNoise::identity());
        let x = StateVector::new(1.5, -2.0, 10.0, 20.0);
        assert_eq!(sensor.measurement_matrix * x, Vector2::new(1.5, -2.0));
    }
}
