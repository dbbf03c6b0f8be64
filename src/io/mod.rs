//! Input/output helpers.
//!
//! - CSV column ingest + missing-value handling (`ingest`)
//! - histogram CSV and fit report JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
