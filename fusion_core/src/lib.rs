// fusion_core/src/lib.rs

//! Extended Kalman Filter that tracks a 2D constant-velocity target from two
//! sensors: a Cartesian position sensor and a polar (range, bearing,
//! range-rate) sensor.

pub mod config;
pub mod error;
pub mod estimation;
pub mod messages;
pub mod models;
pub mod prelude;
pub mod types;
pub mod utils;
