//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (and covered by exact-string tests)

use crate::data::Perturbation;
use crate::domain::GaussianParams;
use crate::error::AppError;

const RULE: &str = "--------------------------";

/// `Parameters for Roll No <r>: ar=<a>, br=<b>` (three decimals).
pub fn format_perturbation(identifier: i64, p: &Perturbation) -> String {
    format!(
        "Parameters for Roll No {identifier}: ar={:.3}, br={:.3}",
        p.a, p.b
    )
}

/// The learned-parameter block, six decimals per value.
pub fn format_learned_parameters(params: &GaussianParams) -> String {
    let mut out = String::new();
    out.push_str("\n--- Learned Parameters ---\n");
    out.push_str(&format!("c      : {:.6}\n", params.c));
    out.push_str(&format!("lambda : {:.6}\n", params.lambda));
    out.push_str(&format!("mu     : {:.6}\n", params.mu));
    out.push_str(RULE);
    out
}

/// Message printed when the solver does not converge.
pub fn format_fit_failure(err: &AppError) -> String {
    match err {
        AppError::FitDiverged { reason, .. } => format!("Error in parameter estimation: {reason}"),
        other => format!("Error in parameter estimation: {other}"),
    }
}
