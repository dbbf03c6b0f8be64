//! Export histogram bins (CSV) and the fit report (JSON).
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; they are only written after a successful fit.

use std::fs::File;
use std::path::Path;

use crate::domain::{FitReport, GaussianParams};
use crate::error::AppError;
use crate::math::histogram::Histogram;
use crate::models::pdf;

/// Write one row per bin with the observed and fitted density.
pub fn write_histogram_csv(
    path: &Path,
    histogram: &Histogram,
    params: &GaussianParams,
) -> Result<(), AppError> {
    let context = format!("Failed to write histogram CSV '{}'", path.display());
    let mut writer = csv::Writer::from_path(path).map_err(|e| AppError::csv(context.clone(), e))?;

    writer
        .write_record(["bin_left", "bin_right", "center", "count", "density", "fitted"])
        .map_err(|e| AppError::csv(context.clone(), e))?;

    for bin in &histogram.bins {
        let center = bin.center();
        writer
            .write_record([
                format!("{:.10}", bin.left),
                format!("{:.10}", bin.right),
                format!("{center:.10}"),
                bin.count.to_string(),
                format!("{:.10}", bin.density),
                format!("{:.10}", pdf(center, params)),
            ])
            .map_err(|e| AppError::csv(context.clone(), e))?;
    }

    writer.flush().map_err(|e| AppError::io(context, e))?;
    Ok(())
}

/// Write the fit report as pretty-printed JSON.
pub fn write_fit_json(path: &Path, report: &FitReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fit JSON '{}'", path.display()), e))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::io("Failed to write fit JSON", e.into()))?;
    Ok(())
}
