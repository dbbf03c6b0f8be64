//! Levenberg–Marquardt nonlinear least squares.
//!
//! We minimize `S(x) = Σ r_i(x)^2` for a small parameter vector `x`.
//!
//! Each iteration linearizes the residuals around `x` and solves the damped
//! problem
//!
//! ```text
//! minimize ‖J δ + r‖² + λ_d ‖D δ‖²
//! ```
//!
//! where `D` holds the running maximum of the Jacobian column norms. Keeping the
//! maximum (instead of the current norm) stops the damping from vanishing on a
//! parameter whose column collapses, e.g. the center of a peak that is
//! flattening out.
//!
//! Stopping rules follow the usual MINPACK defaults for unconstrained fits:
//! - relative reduction of `S` (actual and predicted) below `ftol`
//! - scaled step length below `xtol` times the scaled parameter norm
//! - an exact fit (`S == 0`)
//!
//! Running out of function evaluations, non-finite residuals at the start, or a
//! damping factor that grows without bound is a divergence.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::AppError;
use crate::math::ols::solve_damped_step;

/// Default relative tolerance on the cost and on the step (`sqrt(f64::EPSILON)`).
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_GAIN_RATIO: f64 = 1e-4;
const MAX_DAMPING: f64 = 1e300;

/// A residual vector and its Jacobian as functions of the parameters.
pub trait ResidualModel {
    /// Residuals `r_i(x)`; non-finite entries are allowed and reject a step.
    fn residuals(&self, x: &[f64]) -> DVector<f64>;

    /// Jacobian `∂r_i/∂x_j` (rows = residuals, columns = parameters).
    fn jacobian(&self, x: &[f64]) -> DMatrix<f64>;
}

/// Solver settings.
#[derive(Debug, Clone)]
pub struct LmOptions {
    pub ftol: f64,
    pub xtol: f64,
    pub max_evaluations: usize,
}

impl LmOptions {
    /// Defaults for a problem with `n_params` parameters: `200 * (n_params + 1)` evaluations.
    pub fn for_params(n_params: usize) -> Self {
        Self {
            ftol: DEFAULT_TOLERANCE,
            xtol: DEFAULT_TOLERANCE,
            max_evaluations: 200 * (n_params + 1),
        }
    }
}

/// Which test ended the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ExactFit,
    CostTolerance,
    StepTolerance,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::ExactFit => "exact fit",
            StopReason::CostTolerance => "relative reduction in the sum of squares below ftol",
            StopReason::StepTolerance => "relative step size below xtol",
        }
    }
}

/// A converged solution.
#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub x: Vec<f64>,
    /// Final sum of squared residuals.
    pub sse: f64,
    pub evaluations: usize,
    pub iterations: usize,
    pub stop: StopReason,
}

/// Minimize `Σ r_i(x)^2` starting from `x0`.
pub fn levenberg_marquardt<M: ResidualModel>(
    model: &M,
    x0: &[f64],
    opts: &LmOptions,
) -> Result<LmOutcome, AppError> {
    let p = x0.len();
    let mut x = DVector::from_column_slice(x0);
    let mut r = model.residuals(x.as_slice());
    let mut evaluations = 1usize;

    if x.iter().any(|v| !v.is_finite()) || r.iter().any(|v| !v.is_finite()) {
        return Err(AppError::diverged(
            "Residuals are not finite at the initial guess",
            evaluations,
        ));
    }

    let mut sse = r.norm_squared();
    let mut scale = vec![0.0_f64; p];
    let mut damping = INITIAL_DAMPING;
    let mut nu = 2.0_f64;
    let mut iterations = 0usize;

    loop {
        if sse == 0.0 {
            return finish(x, sse, evaluations, iterations, StopReason::ExactFit);
        }

        let j = model.jacobian(x.as_slice());
        if j.iter().any(|v| !v.is_finite()) {
            return Err(AppError::diverged("Jacobian is not finite", evaluations));
        }
        for (k, s) in scale.iter_mut().enumerate() {
            *s = s.max(j.column(k).norm());
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        loop {
            if evaluations >= opts.max_evaluations {
                return Err(AppError::diverged(
                    format!(
                        "Optimal parameters not found: number of calls to function has reached maxfev = {}",
                        opts.max_evaluations
                    ),
                    evaluations,
                ));
            }

            let step = solve_damped_step(&j, &r, &scale, damping).ok_or_else(|| {
                AppError::diverged("Damped step could not be solved (singular system)", evaluations)
            })?;

            let step_norm = scaled_norm(&scale, step.as_slice());
            let x_norm = scaled_norm(&scale, x.as_slice());
            let small_step = step_norm <= opts.xtol * x_norm;

            let x_new = &x + &step;
            let r_new = model.residuals(x_new.as_slice());
            evaluations += 1;

            let sse_new = if r_new.iter().all(|v| v.is_finite()) {
                r_new.norm_squared()
            } else {
                f64::INFINITY
            };
            let predicted = (&r + &j * &step).norm_squared();
            let actual_reduction = sse - sse_new;
            let predicted_reduction = sse - predicted;
            let gain = if predicted_reduction > 0.0 {
                actual_reduction / predicted_reduction
            } else {
                0.0
            };

            if sse_new.is_finite() && gain > MIN_GAIN_RATIO {
                let sse_old = sse;
                x = x_new;
                r = r_new;
                sse = sse_new;
                iterations += 1;

                damping *= (1.0_f64 / 3.0).max(1.0 - (2.0 * gain - 1.0).powi(3));
                nu = 2.0;

                debug!(iterations, evaluations, sse, damping, "accepted step");

                if actual_reduction <= opts.ftol * sse_old && predicted_reduction <= opts.ftol * sse_old {
                    return finish(x, sse, evaluations, iterations, StopReason::CostTolerance);
                }
                if small_step {
                    return finish(x, sse, evaluations, iterations, StopReason::StepTolerance);
                }
                break;
            }

            if small_step {
                return finish(x, sse, evaluations, iterations, StopReason::StepTolerance);
            }

            damping *= nu;
            nu *= 2.0;
            if !damping.is_finite() || damping > MAX_DAMPING {
                return Err(AppError::diverged("Damping grew without bound", evaluations));
            }
        }
    }
}

fn finish(
    x: DVector<f64>,
    sse: f64,
    evaluations: usize,
    iterations: usize,
    stop: StopReason,
) -> Result<LmOutcome, AppError> {
    if x.iter().any(|v| !v.is_finite()) || !sse.is_finite() {
        return Err(AppError::diverged("Solver produced non-finite parameters", evaluations));
    }
    Ok(LmOutcome {
        x: x.iter().copied().collect(),
        sse,
        evaluations,
        iterations,
        stop,
    })
}

fn scaled_norm(scale: &[f64], v: &[f64]) -> f64 {
    scale
        .iter()
        .zip(v)
        .map(|(s, x)| (s * x) * (s * x))
        .sum::<f64>()
        .sqrt()
}
