//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - printed by the reporter

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::Perturbation;
use crate::error::AppError;

/// Column fitted when none is given on the command line.
pub const DEFAULT_COLUMN: &str = "no2";

/// Number of equal-width histogram bins.
pub const DEFAULT_BINS: usize = 100;

/// Number of points used to draw the fitted curve.
pub const CURVE_SAMPLES: usize = 500;

/// Parameters of `pdf(z) = c * exp(-λ (z - μ)^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    /// Amplitude.
    pub c: f64,
    /// Inverse width; positive for a proper peak (not enforced).
    pub lambda: f64,
    /// Center.
    pub mu: f64,
}

impl GaussianParams {
    pub fn new(c: f64, lambda: f64, mu: f64) -> Self {
        Self { c, lambda, mu }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.c, self.lambda, self.mu]
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            c: values[0],
            lambda: values[1],
            mu: values[2],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.c.is_finite() && self.lambda.is_finite() && self.mu.is_finite()
    }
}

/// Solver diagnostics for a converged fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    /// Residual sum of squares over the bin centers.
    pub sse: f64,
    pub rmse: f64,
    /// Number of residual vector evaluations.
    pub evaluations: usize,
    /// Number of accepted steps.
    pub iterations: usize,
    /// Number of fitted points (bins).
    pub n: usize,
    /// Which stopping test fired.
    pub converged_by: String,
}

/// Output of the density estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityFit {
    pub params: GaussianParams,
    pub initial: GaussianParams,
    pub quality: FitQuality,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment and `.env` (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub identifier: i64,
    pub column: String,
    pub bins: usize,
    /// Solver evaluation budget; `None` uses the default of `200 * (params + 1)`.
    pub max_evaluations: Option<usize>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub window: bool,
    pub save_plot: Option<PathBuf>,

    pub export_histogram: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

impl RunConfig {
    /// Defaults matching the CLI, for the given input and identifier.
    pub fn new(csv_path: impl Into<PathBuf>, identifier: i64) -> Self {
        Self {
            csv_path: csv_path.into(),
            identifier,
            column: DEFAULT_COLUMN.to_string(),
            bins: DEFAULT_BINS,
            max_evaluations: None,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            window: false,
            save_plot: None,
            export_histogram: None,
            export_fit: None,
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.identifier < 0 {
            return Err(AppError::InvalidIdentifier(format!(
                "{} (identifiers must be non-negative)",
                self.identifier
            )));
        }
        if self.bins == 0 {
            return Err(AppError::InvalidConfig("bins must be at least 1".to_string()));
        }
        if self.max_evaluations == Some(0) {
            return Err(AppError::InvalidConfig(
                "max evaluations must be at least 1".to_string(),
            ));
        }
        if self.column.trim().is_empty() {
            return Err(AppError::InvalidConfig("column name must not be empty".to_string()));
        }
        if self.plot && (self.plot_width < 4 || self.plot_height < 3) {
            return Err(AppError::InvalidConfig(format!(
                "plot size {}x{} is too small (minimum 4x3)",
                self.plot_width, self.plot_height
            )));
        }
        Ok(())
    }
}

/// A saved fit report (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub column: String,
    pub identifier: i64,
    pub perturbation: Perturbation,
    pub n_samples: usize,
    pub bins: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub fit: DensityFit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::new("data.csv", 7).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let neg = RunConfig::new("data.csv", -1);
        assert!(matches!(neg.validate(), Err(AppError::InvalidIdentifier(_))));

        let mut zero_bins = RunConfig::new("data.csv", 1);
        zero_bins.bins = 0;
        assert!(matches!(zero_bins.validate(), Err(AppError::InvalidConfig(_))));

        let mut no_budget = RunConfig::new("data.csv", 1);
        no_budget.max_evaluations = Some(0);
        assert!(matches!(no_budget.validate(), Err(AppError::InvalidConfig(_))));

        let mut tiny = RunConfig::new("data.csv", 1);
        tiny.plot_width = 2;
        assert!(tiny.validate().is_err());
        tiny.plot = false;
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn params_round_trip_through_slices() {
        let p = GaussianParams::new(0.1, 0.002, 30.0);
        assert_eq!(GaussianParams::from_slice(&p.as_array()), p);
        assert!(p.is_finite());
        assert!(!GaussianParams::new(f64::NAN, 1.0, 0.0).is_finite());
    }
}
