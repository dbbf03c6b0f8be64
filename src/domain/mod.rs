//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the run configuration (`RunConfig`)
//! - fitted model parameters and diagnostics (`GaussianParams`, `DensityFit`)
//! - the exported report schema (`FitReport`)

pub mod types;

pub use types::*;
