//! Shared estimation pipeline used by the CLI front-end and tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV column -> perturbation -> histogram -> density fit
//!
//! The caller then focuses on presentation (printing, plotting, exports).

use chrono::Utc;
use tracing::{debug, info};

use crate::data::Perturbation;
use crate::domain::{FitReport, RunConfig};
use crate::error::AppError;
use crate::fit::{DensityEstimate, estimate_density_with};
use crate::math::lm::LmOptions;
use crate::models::PARAM_COUNT;
use crate::io::ingest::{ColumnData, load_column};

/// The raw column and its perturbed counterpart.
#[derive(Debug, Clone)]
pub struct PreparedSample {
    pub column: ColumnData,
    pub perturbation: Perturbation,
    pub transformed: Vec<f64>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: PreparedSample,
    pub estimate: DensityEstimate,
}

/// Load the configured column and apply the identifier's perturbation.
pub fn prepare_sample(config: &RunConfig) -> Result<PreparedSample, AppError> {
    let perturbation = Perturbation::from_identifier(config.identifier)?;
    let column = load_column(&config.csv_path, &config.column)?;
    if perturbation.is_identity() {
        debug!(identifier = config.identifier, "identifier leaves the sample unchanged");
    }
    let transformed = perturbation.transform(&column.values);
    info!(
        identifier = config.identifier,
        a = perturbation.a,
        b = perturbation.b,
        n = transformed.len(),
        "applied perturbation"
    );
    Ok(PreparedSample {
        column,
        perturbation,
        transformed,
    })
}

/// Fit the density of an already prepared sample.
pub fn estimate(sample: PreparedSample, config: &RunConfig) -> Result<RunOutput, AppError> {
    let mut opts = LmOptions::for_params(PARAM_COUNT);
    if let Some(max) = config.max_evaluations {
        opts.max_evaluations = max;
    }
    let estimate = estimate_density_with(&sample.transformed, config.bins, &opts)?;
    Ok(RunOutput { sample, estimate })
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    config.validate()?;
    let sample = prepare_sample(config)?;
    estimate(sample, config)
}

impl RunOutput {
    /// Summary suitable for the JSON export.
    pub fn report(&self, config: &RunConfig) -> FitReport {
        let (z_min, z_max) = self.estimate.histogram.range();
        FitReport {
            tool: "no2pdf".to_string(),
            generated_at: Utc::now(),
            source: config.csv_path.display().to_string(),
            column: self.sample.column.column.clone(),
            identifier: config.identifier,
            perturbation: self.sample.perturbation,
            n_samples: self.sample.transformed.len(),
            bins: self.estimate.histogram.bins.len(),
            z_min,
            z_max,
            fit: self.estimate.fit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("no2-density-pipeline-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn uniform_sample_with_identity_perturbation() {
        let mut csv = String::from("stn_code,no2\n");
        for i in 1..=1000 {
            csv.push_str(&format!("{i},{i}\n"));
        }
        let path = write_csv("uniform.csv", &csv);
        let config = RunConfig::new(&path, 0);

        let out = run_pipeline(&config).unwrap();
        assert_eq!(out.sample.transformed, out.sample.column.values);
        assert_eq!(out.estimate.histogram.bins.len(), 100);
        assert!((out.estimate.histogram.area() - 1.0).abs() < 1e-9);

        // A flat histogram is best matched by an infinitely wide peak.
        let p = out.estimate.fit.params;
        assert!(p.is_finite());
        assert!(p.lambda > 0.0 && p.lambda < 1e-6, "lambda={}", p.lambda);
        let flat = 10.0 / (1000.0 * 9.99);
        assert!((p.c - flat).abs() < 0.01 * flat, "c={}", p.c);

        let report = out.report(&config);
        assert_eq!(report.n_samples, 1000);
        assert_eq!(report.column, "no2");
        assert_eq!(report.z_min, 1.0);
        assert_eq!(report.z_max, 1000.0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn perturbation_is_applied_to_every_value() {
        let path = write_csv("perturbed.csv", "NO2\n1.0\n\n2.5\nNA\n4.0\n");
        let sample = prepare_sample(&RunConfig::new(&path, 34)).unwrap();
        let p = sample.perturbation;
        assert_eq!(sample.column.values, vec![1.0, 2.5, 4.0]);
        assert_eq!(sample.transformed.len(), 3);
        for (x, z) in sample.column.values.iter().zip(&sample.transformed) {
            assert!((z - (x + p.a * (p.b * x).sin())).abs() < 1e-12);
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn all_missing_values_is_empty_data() {
        let path = write_csv("missing.csv", "no2,so2\n,1\nNA,2\nnan,3\n");
        let err = run_pipeline(&RunConfig::new(&path, 3)).unwrap_err();
        assert!(matches!(err, AppError::EmptyData { .. }), "{err:?}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn constant_values_are_an_invalid_range() {
        let path = write_csv("constant.csv", "no2\n5\n5\n5\n");
        let err = run_pipeline(&RunConfig::new(&path, 7)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }), "{err:?}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn absent_column_is_reported() {
        let path = write_csv("nocol.csv", "so2,rspm\n1,2\n");
        let err = run_pipeline(&RunConfig::new(&path, 1)).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn { .. }), "{err:?}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let config = RunConfig::new("/nonexistent/no2-density/data.csv", 1);
        let err = run_pipeline(&config).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
