//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - resolves the identifier (flag, environment or prompt)
//! - runs the estimation pipeline (`run_with`)
//! - prints the report and plots, and writes optional exports

use std::io::{self, Write};

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::report::{format_fit_failure, format_learned_parameters, format_perturbation};

pub mod pipeline;

/// Entry point for the `no2pdf` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is fine; flags and the real environment still apply.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let identifier = match cli.roll {
        Some(id) => id,
        None => crate::cli::prompt::prompt_identifier()?,
    };
    let stdout = io::stdout();
    run_with(&cli, identifier, &mut stdout.lock())
}

/// Run the estimation for already parsed arguments, writing the report to `out`.
///
/// A solver failure is reported on `out` and ends the run successfully without
/// plots or exports; every other error propagates.
pub fn run_with<W: Write>(cli: &Cli, identifier: i64, out: &mut W) -> Result<(), AppError> {
    let config = run_config_from_args(cli, identifier);
    config.validate()?;
    debug!(?config, "resolved configuration");

    emit(out, &format!("Loading data from {}...", config.csv_path.display()))?;
    let sample = pipeline::prepare_sample(&config)?;
    emit(out, &format_perturbation(identifier, &sample.perturbation))?;

    let run = match pipeline::estimate(sample, &config) {
        Ok(run) => run,
        Err(err) if err.is_fit_failure() => {
            warn!(error = %err, "density fit failed");
            return emit(out, &format_fit_failure(&err));
        }
        Err(err) => return Err(err),
    };

    let histogram = &run.estimate.histogram;
    let params = &run.estimate.fit.params;
    emit(out, &format_learned_parameters(params))?;

    if config.plot {
        emit(
            out,
            &crate::plot::render_ascii_plot(histogram, params, config.plot_width, config.plot_height),
        )?;
    }

    let title = chart_title(identifier);
    if let Some(path) = &config.save_plot {
        crate::plot::save_svg_plot(path, histogram, params, &title)?;
        emit(out, &format!("Saved plot to {}", path.display()))?;
    }
    if let Some(path) = &config.export_histogram {
        crate::io::export::write_histogram_csv(path, histogram, params)?;
        emit(out, &format!("Wrote histogram to {}", path.display()))?;
    }
    if let Some(path) = &config.export_fit {
        crate::io::export::write_fit_json(path, &run.report(&config))?;
        emit(out, &format!("Wrote fit report to {}", path.display()))?;
    }
    if config.window {
        crate::tui::show_chart(&title, histogram, params)?;
    }

    Ok(())
}

fn emit<W: Write>(out: &mut W, text: &str) -> Result<(), AppError> {
    writeln!(out, "{text}").map_err(|e| AppError::io("Failed to write report", e))
}

/// Convert parsed arguments into the plain pipeline configuration.
pub fn run_config_from_args(cli: &Cli, identifier: i64) -> RunConfig {
    RunConfig {
        csv_path: cli.csv.clone(),
        identifier,
        column: cli.column.clone(),
        bins: cli.bins,
        max_evaluations: cli.max_evaluations,
        plot: !cli.no_plot,
        plot_width: cli.width,
        plot_height: cli.height,
        window: cli.window,
        save_plot: cli.save_plot.clone(),
        export_histogram: cli.export.clone(),
        export_fit: cli.export_fit.clone(),
    }
}

fn chart_title(identifier: i64) -> String {
    format!("PDF Estimation for Roll Number: {identifier}")
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
