//! Command-line parsing for the NO2 density estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation code. Values can also come from the environment (or a `.env`
//! file loaded before parsing).

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{DEFAULT_BINS, DEFAULT_COLUMN};

pub mod prompt;

/// Default input file, looked up in the working directory.
pub const DEFAULT_CSV: &str = "india-air-quality-data.csv";

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "no2pdf",
    version,
    about = "Fit a Gaussian-shaped density to a perturbed NO2 sample"
)]
pub struct Cli {
    /// Air-quality CSV to read.
    #[arg(short = 'f', long = "csv", env = "NO2PDF_CSV", default_value = DEFAULT_CSV)]
    pub csv: PathBuf,

    /// Roll number selecting the perturbation (prompted for when absent).
    #[arg(short = 'r', long = "roll", env = "NO2PDF_ROLL", allow_negative_numbers = true)]
    pub roll: Option<i64>,

    /// Column holding the raw values.
    #[arg(long, default_value = DEFAULT_COLUMN)]
    pub column: String,

    /// Number of equal-width histogram bins.
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,

    /// Cap on residual evaluations for the density fit.
    #[arg(long = "max-evaluations", value_name = "N")]
    pub max_evaluations: Option<usize>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Open an interactive chart window (q/Esc closes it).
    #[arg(long)]
    pub window: bool,

    /// Save the chart as an SVG file.
    #[arg(long = "save-plot", value_name = "SVG")]
    pub save_plot: Option<PathBuf>,

    /// Export histogram bins with observed and fitted density to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the fit report to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_when_flags_are_absent() {
        let cli = Cli::try_parse_from(["no2pdf", "-f", "data.csv", "-r", "12"]).unwrap();
        assert_eq!(cli.csv, PathBuf::from("data.csv"));
        assert_eq!(cli.roll, Some(12));
        assert_eq!(cli.column, "no2");
        assert_eq!(cli.bins, 100);
        assert!(!cli.no_plot);
        assert!(!cli.window);
        assert!(cli.export.is_none());
    }

    #[test]
    fn negative_roll_reaches_validation() {
        let cli = Cli::try_parse_from(["no2pdf", "-f", "data.csv", "--roll", "-3"]).unwrap();
        assert_eq!(cli.roll, Some(-3));
    }

    #[test]
    fn non_integer_roll_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["no2pdf", "-f", "data.csv", "-r", "abc"]).is_err());
    }
}
