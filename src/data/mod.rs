//! Sample preparation applied before density estimation.

pub mod perturb;

pub use perturb::*;
