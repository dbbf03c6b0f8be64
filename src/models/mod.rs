//! Density model implementations.
//!
//! Models are implemented as small, pure functions so that the fitting code can
//! stay generic over the parameter vector.

pub mod gaussian;

pub use gaussian::*;
