// fusion_core/src/models/dynamics/mod.rs

use crate::config::ProcessNoiseConfig;
use crate::types::{ProcessNoise, TransitionMatrix};

// --- Constant Velocity Model ---
// The target keeps its velocity between measurements; any acceleration is
// treated as white noise and folded into Q.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantVelocityModel {
    /// Variance of the unmodeled acceleration along x.
    pub accel_x_variance: f64,
    /// Variance of the unmodeled acceleration along y.
    pub accel_y_variance: f64,
}

impl ConstantVelocityModel {
    pub fn new(accel_x_variance: f64, accel_y_variance: f64) -> Self {
        Self {
            accel_x_variance,
            accel_y_variance,
        }
    }

    pub fn from_config(config: &ProcessNoiseConfig) -> Self {
        Self::new(config.accel_x_variance, config.accel_y_variance)
    }

    /// Transition matrix F for a step of `dt` seconds.
    ///
    /// Identity except for the two position-from-velocity couplings.
    pub fn transition_matrix(&self, dt: f64) -> TransitionMatrix {
        let mut f = TransitionMatrix::identity();
        Self::set_elapsed(&mut f, dt);
        f
    }

    /// Writes `dt` into the coupling entries of an existing F in place.
    pub fn set_elapsed(f: &mut TransitionMatrix, dt: f64) {
        // d(Px)/d(Vx) and d(Py)/d(Vy)
        f[(0, 2)] = dt;
        f[(1, 3)] = dt;
    }

    /// Process noise Q for a step of `dt` seconds.
    ///
    /// Q = G diag(σ²ax, σ²ay) Gᵀ with G = [[dt²/2, 0], [0, dt²/2], [dt, 0], [0, dt]].
    pub fn process_noise(&self, dt: f64) -> ProcessNoise {
        let dt_2 = dt * dt;
        let dt_3 = dt_2 * dt;
        let dt_4 = dt_3 * dt;

        let nx = self.accel_x_variance;
        let ny = self.accel_y_variance;

        #[rustfmt::skip]
        let q = ProcessNoise::new(
            dt_4 / 4.0 * nx, 0.0,             dt_3 / 2.0 * nx, 0.0,
            0.0,             dt_4 / 4.0 * ny, 0.0,             dt_3 / 2.0 * ny,
            dt_3 / 2.0 * nx, 0.0,             dt_2 * nx,       0.0,
            0.0,             dt_3 / 2.0 * ny, 0.0,             dt_2 * ny,
        );
        q
    }
}

impl Default for ConstantVelocityModel {
    fn default() -> Self {
        Self::from_config(&ProcessNoiseConfig::default())
    }
}
