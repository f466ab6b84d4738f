//! Configuration for density estimation, contour extraction and point
//! accumulation.

use serde::{Deserialize, Serialize};

use crate::error::{KdeError, KdeResult};

/// Default iso-density threshold for contour extraction.
pub const DEFAULT_THRESHOLD: f64 = 0.56055178;

/// Radius assigned to samples that do not carry one.
pub const DEFAULT_RADIUS: f64 = 40.0;

/// Default grid spacing in coordinate units (degrees for lng/lat data).
pub const DEFAULT_GRID_SIZE: f64 = 0.001;

/// Default Gaussian bandwidth in coordinate units.
pub const DEFAULT_BANDWIDTH: f64 = 0.002;

/// Configuration for building a density field and extracting contours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdeConfig {
    /// Spacing between grid cells.
    pub grid_size: f64,

    /// Gaussian kernel width.
    pub bandwidth: f64,

    /// Iso-density level handed to marching squares.
    pub threshold: f64,

    /// Skip samples further than this many bandwidths from a cell.
    /// `None` evaluates every sample for every cell.
    pub cutoff_sigmas: Option<f64>,

    /// Reject non-finite coordinates and degenerate bounds instead of
    /// silently producing no contours.
    pub strict_bounds: bool,
}

impl Default for KdeConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            bandwidth: DEFAULT_BANDWIDTH,
            threshold: DEFAULT_THRESHOLD,
            cutoff_sigmas: None,
            strict_bounds: false,
        }
    }
}

impl KdeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("KDE_GRID_SIZE") {
            if let Ok(size) = val.parse() {
                config.grid_size = size;
            }
        }

        if let Ok(val) = std::env::var("KDE_BANDWIDTH") {
            if let Ok(bandwidth) = val.parse() {
                config.bandwidth = bandwidth;
            }
        }

        if let Ok(val) = std::env::var("KDE_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("KDE_CUTOFF_SIGMAS") {
            config.cutoff_sigmas = val.parse().ok();
        }

        if let Ok(val) = std::env::var("KDE_STRICT_BOUNDS") {
            config.strict_bounds = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_cutoff_sigmas(mut self, sigmas: f64) -> Self {
        self.cutoff_sigmas = Some(sigmas);
        self
    }

    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> KdeResult<()> {
        ensure_positive("grid_size", self.grid_size)?;
        ensure_positive("bandwidth", self.bandwidth)?;

        if !self.threshold.is_finite() {
            return Err(KdeError::invalid_parameter(
                "threshold",
                format!("must be finite, got {}", self.threshold),
            ));
        }

        if let Some(sigmas) = self.cutoff_sigmas {
            ensure_positive("cutoff_sigmas", sigmas)?;
        }

        Ok(())
    }
}

/// Configuration for a point accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccumulatorConfig {
    /// Record key holding the x coordinate.
    pub x_field: String,

    /// Record key holding the y coordinate.
    pub y_field: String,

    /// Record key holding the sample value.
    pub value_field: String,

    /// Radius assigned to buckets created from samples without one.
    pub default_radius: f64,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            x_field: "x".to_string(),
            y_field: "y".to_string(),
            value_field: "value".to_string(),
            default_radius: DEFAULT_RADIUS,
        }
    }
}

impl AccumulatorConfig {
    /// Default field names, with `KDE_DEFAULT_RADIUS` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("KDE_DEFAULT_RADIUS") {
            if let Ok(radius) = val.parse() {
                config.default_radius = radius;
            }
        }

        config
    }

    /// Use custom record keys for the coordinates and value.
    pub fn with_fields(
        mut self,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        self.x_field = x_field.into();
        self.y_field = y_field.into();
        self.value_field = value_field.into();
        self
    }

    pub fn with_default_radius(mut self, radius: f64) -> Self {
        self.default_radius = radius;
        self
    }
}

fn ensure_positive(param: &str, value: f64) -> KdeResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KdeError::invalid_parameter(
            param,
            format!("must be finite and > 0, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KdeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert!(config.cutoff_sigmas.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_bandwidth() {
        let config = KdeConfig::default().with_bandwidth(0.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, KdeError::InvalidParameter { ref param, .. } if param == "bandwidth"));
    }

    #[test]
    fn test_validate_rejects_nan_grid_size() {
        let config = KdeConfig::default().with_grid_size(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: KdeConfig = serde_yaml::from_str("bandwidth: 0.5\n").unwrap();
        assert_eq!(config.bandwidth, 0.5);
        assert_eq!(config.grid_size, DEFAULT_GRID_SIZE);
    }

    #[test]
    fn test_accumulator_config_fields() {
        let config = AccumulatorConfig::default().with_fields("lng", "lat", "density");
        assert_eq!(config.x_field, "lng");
        assert_eq!(config.value_field, "density");
        assert_eq!(config.default_radius, DEFAULT_RADIUS);
    }

    #[test]
    fn test_accumulator_default_radius_from_env() {
        std::env::set_var("KDE_DEFAULT_RADIUS", "25");
        assert_eq!(AccumulatorConfig::from_env().default_radius, 25.0);

        std::env::set_var("KDE_DEFAULT_RADIUS", "wide");
        assert_eq!(AccumulatorConfig::from_env().default_radius, DEFAULT_RADIUS);

        std::env::remove_var("KDE_DEFAULT_RADIUS");
    }
}
