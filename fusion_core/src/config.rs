// fusion_core/src/config.rs

//! Tunable parameters of the filter and how they are loaded from disk.
//!
//! Every field has a default, so a TOML file only needs to mention the values
//! it overrides:
//!
//! ```toml
//! covariance_update = "joseph"
//!
//! [process_noise]
//! accel_x_variance = 5.0
//! ```

use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use nalgebra::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::FusionError;
use crate::types::{CartesianNoise, PolarNoise, StateCovariance};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// All configuration for one filter instance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    pub process_noise: ProcessNoiseConfig,
    pub cartesian_noise: CartesianNoiseConfig,
    pub polar_noise: PolarNoiseConfig,
    pub initial_covariance: InitialCovarianceConfig,
    pub covariance_update: CovarianceUpdate,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

/// Variances of the unmodeled acceleration on each axis, in (m/s²)².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessNoiseConfig {
    pub accel_x_variance: f64,
    pub accel_y_variance: f64,
}

impl Default for ProcessNoiseConfig {
    fn default() -> Self {
        Self {
            accel_x_variance: 9.0,
            accel_y_variance: 9.0,
        }
    }
}

/// Measurement noise of the Cartesian position sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartesianNoiseConfig {
    pub px_variance: f64,
    pub py_variance: f64,
}

impl Default for CartesianNoiseConfig {
    fn default() -> Self {
        Self {
            px_variance: 0.0225,
            py_variance: 0.0225,
        }
    }
}

impl CartesianNoiseConfig {
    pub fn noise_matrix(&self) -> CartesianNoise {
        Matrix2::from_diagonal(&Vector2::new(self.px_variance, self.py_variance))
    }
}

/// Measurement noise of the polar sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolarNoiseConfig {
    pub range_variance: f64,
    pub bearing_variance: f64,
    pub range_rate_variance: f64,
}

impl Default for PolarNoiseConfig {
    fn default() -> Self {
        Self {
            range_variance: 0.09,
            bearing_variance: 0.0009,
            range_rate_variance: 0.09,
        }
    }
}

impl PolarNoiseConfig {
    pub fn noise_matrix(&self) -> PolarNoise {
        Matrix3::from_diagonal(&Vector3::new(
            self.range_variance,
            self.bearing_variance,
            self.range_rate_variance,
        ))
    }
}

/// Diagonal of P assigned when the first measurement initializes the state.
/// The large velocity variance encodes "velocity unknown".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialCovarianceConfig {
    pub position_variance: f64,
    pub velocity_variance: f64,
}

impl Default for InitialCovarianceConfig {
    fn default() -> Self {
        Self {
            position_variance: 1.0,
            velocity_variance: 1000.0,
        }
    }
}

impl InitialCovarianceConfig {
    pub fn covariance(&self) -> StateCovariance {
        let p = self.position_variance;
        let v = self.velocity_variance;
        Matrix4::from_diagonal(&Vector4::new(p, p, v, v))
    }
}

/// Which formula the measurement update uses for the posterior covariance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CovarianceUpdate {
    /// `P = (I - K H) P`. Cheap, but can drift away from symmetry when the
    /// gain is computed from an ill-conditioned innovation covariance.
    #[default]
    Standard,
    /// `P = (I - K H) P (I - K H)^T + K R K^T`. Keeps P symmetric PSD.
    Joseph,
}

// =========================================================================
// == Loading and Validation ==
// =========================================================================

impl FusionConfig {
    /// A figment seeded with the built-in defaults. Callers can merge further
    /// providers on top before calling [`FusionConfig::from_figment`].
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(FusionConfig::default()))
    }

    /// Extracts and validates a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, FusionError> {
        let config: FusionConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file layered over the defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FusionError> {
        let path = path.as_ref();
        tracing::info!("Loading filter configuration from: {}", path.display());
        // Figment treats a missing file as an empty provider.
        if !path.is_file() {
            return Err(FusionError::InvalidConfig(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }
        Self::from_figment(Self::figment().merge(Toml::file(path)))
    }

    /// Parses a TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, FusionError> {
        Self::from_figment(Self::figment().merge(Toml::string(toml)))
    }

    /// Checks that every variance is finite and non-negative.
    pub fn validate(&self) -> Result<(), FusionError> {
        let fields = [
            ("process_noise.accel_x_variance", self.process_noise.accel_x_variance),
            ("process_noise.accel_y_variance", self.process_noise.accel_y_variance),
            ("cartesian_noise.px_variance", self.cartesian_noise.px_variance),
            ("cartesian_noise.py_variance", self.cartesian_noise.py_variance),
            ("polar_noise.range_variance", self.polar_noise.range_variance),
            ("polar_noise.bearing_variance", self.polar_noise.bearing_variance),
            ("polar_noise.range_rate_variance", self.polar_noise.range_rate_variance),
            ("initial_covariance.position_variance", self.initial_covariance.position_variance),
            ("initial_covariance.velocity_variance", self.initial_covariance.velocity_variance),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(FusionError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative variance (got {value})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_reference_tuning() {
        let config = FusionConfig::default();
        assert_eq!(config.process_noise.accel_x_variance, 9.0);
        assert_eq!(config.process_noise.accel_y_variance, 9.0);
        assert_eq!(config.cartesian_noise.noise_matrix(), Matrix2::new(0.0225, 0.0, 0.0, 0.0225));
        assert_eq!(
            config.polar_noise.noise_matrix(),
            Matrix3::from_diagonal(&Vector3::new(0.09, 0.0009, 0.09))
        );
        assert_eq!(
            config.initial_covariance.covariance(),
            Matrix4::from_diagonal(&Vector4::new(1.0, 1.0, 1000.0, 1000.0))
        );
        assert_eq!(config.covariance_update, CovarianceUpdate::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = FusionConfig::from_toml_str(
            r#"
            covariance_update = "joseph"

            [process_noise]
            accel_x_variance = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.process_noise.accel_x_variance, 4.0);
        assert_eq!(config.process_noise.accel_y_variance, 9.0);
        assert_eq!(config.covariance_update, CovarianceUpdate::Joseph);
        assert_eq!(config.polar_noise, PolarNoiseConfig::default());
    }

    #[test]
    fn loads_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "filter.toml",
                r#"
                [polar_noise]
                bearing_variance = 0.0016
                "#,
            )?;

            let config = FusionConfig::from_toml_file("filter.toml").unwrap();
            assert_eq!(config.polar_noise.bearing_variance, 0.0016);
            assert_eq!(config.polar_noise.range_variance, 0.09);
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = FusionConfig::from_toml_file("absent.toml").unwrap_err();
            assert!(matches!(err, FusionError::InvalidConfig(_)));
            Ok(())
        });
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = FusionConfig::from_toml_str("[process_noise]\naccel_z_variance = 1.0\n")
            .unwrap_err();
        assert!(matches!(err, FusionError::Config(_)));
    }

    #[test]
    fn rejects_negative_variance() {
        let err = FusionConfig::from_toml_str("[cartesian_noise]\npx_variance = -1.0\n")
            .unwrap_err();
        match err {
            FusionError::InvalidConfig(msg) => assert!(msg.contains("cartesian_noise.px_variance")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
