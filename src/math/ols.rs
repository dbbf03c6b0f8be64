//! Linear least squares solver.
//!
//! Every Levenberg–Marquardt step solves a small linear problem of the form:
//!
//! ```text
//! minimize ‖J δ + r‖² + λ_d ‖D δ‖²
//! ```
//!
//! which we write as one stacked (tall) system `[J; sqrt(λ_d) D] δ = [-r; 0]`.
//!
//! Implementation choices:
//! - We use SVD so tall systems are handled without forming `JᵀJ` explicitly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny (3 columns), so SVD cost is negligible
//!   next to evaluating the model on every bin.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Stack `J` on top of `sqrt(damping) * diag(scale)` and `-r` on top of zeros,
/// then solve for the damped Gauss–Newton step.
pub fn solve_damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    scale: &[f64],
    damping: f64,
) -> Option<DVector<f64>> {
    let n = jacobian.nrows();
    let p = jacobian.ncols();
    let sqrt_damping = damping.sqrt();

    let mut a = DMatrix::<f64>::zeros(n + p, p);
    let mut b = DVector::<f64>::zeros(n + p);
    a.view_mut((0, 0), (n, p)).copy_from(jacobian);
    for i in 0..n {
        b[i] = -residuals[i];
    }
    for j in 0..p {
        a[(n + j, j)] = sqrt_damping * scale[j];
    }

    solve_least_squares(&a, &b)
}
