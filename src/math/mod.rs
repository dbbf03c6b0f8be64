//! Mathematical utilities: statistics, histograms and least squares.

pub mod histogram;
pub mod lm;
pub mod ols;
pub mod stats;

pub use histogram::*;
pub use lm::*;
pub use ols::*;
pub use stats::*;
