//! `no2-density` library crate.
//!
//! The binary (`no2pdf`) is a thin wrapper around this library so that:
//!
//! - the estimation pipeline is testable without spawning processes
//! - the pieces (ingest, perturbation, histogram, solver) are reusable
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
