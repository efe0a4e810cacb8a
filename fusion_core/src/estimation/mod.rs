// fusion_core/src/estimation/mod.rs

use crate::error::FusionError;
use crate::messages::MeasurementMessage;
use crate::types::{StateCovariance, StateVector};

/// What a single call to [`StateEstimator::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The first reading of a session seeded the state; nothing was predicted.
    Initialized,
    /// One predict and one update were applied.
    Updated,
    /// The state was predicted but the reading could not be folded in
    /// (polar reading with the predicted position at the sensor origin).
    UpdateSkipped,
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of a single target.
pub trait StateEstimator: Send + Sync {
    /// Folds one timestamped reading into the estimate.
    fn process(&mut self, message: &MeasurementMessage) -> Result<ProcessOutcome, FusionError>;

    /// Returns a reference to the current best estimate of the state.
    fn state(&self) -> &StateVector;

    /// Returns a reference to the covariance of the current estimate.
    fn covariance(&self) -> &StateCovariance;

    /// Returns the estimator to its startup values so it can track a new,
    /// independent session.
    fn reset(&mut self);
}

pub mod filters;
pub mod fusion;
