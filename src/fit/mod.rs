//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - build the density histogram of the transformed sample
//! - seed the Gaussian-shaped model from sample moments
//! - run the Levenberg–Marquardt fit and report diagnostics

pub mod density;

pub use density::*;
