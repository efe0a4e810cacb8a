// fusion_core/src/estimation/filters/kalman.rs

use nalgebra::{SMatrix, SVector};
use tracing::{trace, warn};

use crate::config::CovarianceUpdate;
use crate::error::FusionError;
use crate::models::measurement::polar;
use crate::types::{
    PolarJacobian, PolarMeasurement, PolarNoise, ProcessNoise, StateCovariance, StateVector,
    TransitionMatrix, STATE_DIM,
};
use crate::utils::angles::wrap_to_pi;

/// Relative tolerance used when checking that P is still symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Result of a measurement update that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The reading was folded into x and P.
    Applied,
    /// The reading was ignored and x and P are unchanged.
    Skipped,
}

/// The sensor-agnostic Kalman recursion over the 4-state kinematic model.
///
/// Holds x, P, F and Q. The measurement matrix and noise are supplied per
/// update, since their dimensions depend on the sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanFilter {
    /// The state vector `x = [px, py, vx, vy]`.
    x: StateVector,
    /// The state covariance matrix, P.
    p: StateCovariance,
    /// The transition matrix, F.
    f: TransitionMatrix,
    /// The process noise covariance matrix, Q.
    q: ProcessNoise,
    covariance_update: CovarianceUpdate,
}

impl KalmanFilter {
    pub fn new(x: StateVector, p: StateCovariance, f: TransitionMatrix, q: ProcessNoise) -> Self {
        Self {
            x,
            p,
            f,
            q,
            covariance_update: CovarianceUpdate::default(),
        }
    }

    pub fn with_covariance_update(mut self, covariance_update: CovarianceUpdate) -> Self {
        self.covariance_update = covariance_update;
        self
    }

    pub fn state(&self) -> &StateVector {
        &self.x
    }

    pub fn covariance(&self) -> &StateCovariance {
        &self.p
    }

    pub fn transition(&self) -> &TransitionMatrix {
        &self.f
    }

    pub fn process_noise(&self) -> &ProcessNoise {
        &self.q
    }

    pub fn set_state(&mut self, x: StateVector) {
        self.x = x;
    }

    pub fn transition_mut(&mut self) -> &mut TransitionMatrix {
        &mut self.f
    }

    pub fn set_process_noise(&mut self, q: ProcessNoise) {
        self.q = q;
    }

    /// Advances the estimate one step: `x = F x`, `P = F P Fᵀ + Q`.
    pub fn predict(&mut self) {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;

        trace!("x_pred: {}", self.x.transpose());
        trace!("P_pred: {}", self.p);
    }

    /// Standard Kalman update with a linear measurement model `z = H x + v`.
    ///
    /// On error x and P are left untouched.
    pub fn update<const M: usize>(
        &mut self,
        z: &SVector<f64, M>,
        h: &SMatrix<f64, M, STATE_DIM>,
        r: &SMatrix<f64, M, M>,
    ) -> Result<(), FusionError> {
        let y = z - h * self.x;
        self.correct(&y, h, r)
    }

    /// Extended Kalman update for a polar reading.
    ///
    /// The innovation is taken against the nonlinear prediction `h(x)` and its
    /// bearing component is wrapped into (-π, π]; `h_jac` linearizes `h` for
    /// the gain. If the predicted range is numerically zero the update is
    /// skipped and x and P are left untouched.
    pub fn update_polar(
        &mut self,
        z: &PolarMeasurement,
        h_jac: &PolarJacobian,
        r: &PolarNoise,
    ) -> Result<UpdateOutcome, FusionError> {
        let Some(z_pred) = polar::predict_measurement(&self.x) else {
            warn!("Predicted range is below {}; skipping polar update", polar::MIN_RANGE);
            return Ok(UpdateOutcome::Skipped);
        };

        let mut y = z - z_pred;
        y[1] = wrap_to_pi(y[1]);

        self.correct(&y, h_jac, r)?;
        Ok(UpdateOutcome::Applied)
    }

    /// Checks `|P - Pᵀ| <= tolerance * max(1, |P|)` element-wise.
    pub fn is_covariance_symmetric(&self, tolerance: f64) -> bool {
        let scale = self.p.amax().max(1.0);
        (self.p - self.p.transpose()).amax() <= tolerance * scale
    }

    // --- Shared gain and correction step ---

    fn correct<const M: usize>(
        &mut self,
        y: &SVector<f64, M>,
        h: &SMatrix<f64, M, STATE_DIM>,
        r: &SMatrix<f64, M, M>,
    ) -> Result<(), FusionError> {
        let ht = h.transpose();
        let s = h * self.p * ht + r;
        let s_inv = s
            .try_inverse()
            .filter(|s_inv| s_inv.iter().all(|v| v.is_finite()))
            .ok_or(FusionError::SingularInnovationCovariance)?;
        let k_gain = self.p * ht * s_inv;

        self.x += k_gain * y;
        let i_kh = StateCovariance::identity() - k_gain * h;
        self.p = match self.covariance_update {
            CovarianceUpdate::Standard => i_kh * self.p,
            CovarianceUpdate::Joseph => {
                i_kh * self.p * i_kh.transpose() + k_gain * r * k_gain.transpose()
            }
        };

        if !self.is_covariance_symmetric(SYMMETRY_TOLERANCE) {
            warn!(
                asymmetry = (self.p - self.p.transpose()).amax(),
                "State covariance drifted away from symmetry"
            );
        }
        trace!("x: {}", self.x.transpose());
        trace!("P: {}", self.p);
        Ok(())
    }
}
