//! Error taxonomy for the density pipeline.
//!
//! Every variant maps to a process exit code so `main` can stay tiny:
//! - `2`: bad input (file, column, identifier, flags)
//! - `3`: data that cannot be histogrammed
//! - `4`: fitting/rendering failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column `{column}` (available: {})", available.join(", "))]
    MissingColumn { column: String, available: Vec<String> },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Column `{column}` has no non-missing values")]
    EmptyData { column: String },

    #[error("Cannot build histogram over degenerate range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("{reason} (after {evaluations} function evaluations)")]
    FitDiverged { reason: String, evaluations: usize },

    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }

    pub fn diverged(reason: impl Into<String>, evaluations: usize) -> Self {
        Self::FitDiverged {
            reason: reason.into(),
            evaluations,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. }
            | Self::Csv { .. }
            | Self::MissingColumn { .. }
            | Self::InvalidIdentifier(_)
            | Self::InvalidConfig(_) => 2,
            Self::EmptyData { .. } | Self::InvalidRange { .. } => 3,
            Self::FitDiverged { .. } | Self::Render(_) => 4,
        }
    }

    /// True for solver failures, which the reporter handles without aborting.
    pub fn is_fit_failure(&self) -> bool {
        matches!(self, Self::FitDiverged { .. })
    }
}
