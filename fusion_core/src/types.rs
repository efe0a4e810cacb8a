// fusion_core/src/types.rs

use nalgebra::{Matrix2, Matrix2x4, Matrix3, Matrix3x4, Matrix4, Vector2, Vector3, Vector4};

/// Number of components in the kinematic state `[px, py, vx, vy]`.
pub const STATE_DIM: usize = 4;

// --- Core Type Aliases ---
pub type StateVector = Vector4<f64>;
pub type StateCovariance = Matrix4<f64>;
pub type TransitionMatrix = Matrix4<f64>;
pub type ProcessNoise = Matrix4<f64>;

// --- Cartesian sensor: z = [px, py] ---
pub type CartesianMeasurement = Vector2<f64>;
pub type CartesianMatrix = Matrix2x4<f64>;
pub type CartesianNoise = Matrix2<f64>;

// --- Polar sensor: z = [range, bearing, range_rate] ---
pub type PolarMeasurement = Vector3<f64>;
pub type PolarJacobian = Matrix3x4<f64>;
pub type PolarNoise = Matrix3<f64>;

/// Microseconds per second; measurement timestamps are in microseconds.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;
