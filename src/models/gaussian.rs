//! Gaussian-shaped density model.
//!
//! ```text
//! pdf(z; c, λ, μ) = c * exp(-λ (z - μ)^2)
//! ```
//!
//! The fitter relies on two primitive operations:
//! - evaluate `pdf(z)` (for residuals and plots)
//! - fill a Jacobian row `∂pdf/∂(c, λ, μ)` at `z` (for the damped Gauss–Newton step)

use crate::domain::GaussianParams;

/// Number of free parameters.
pub const PARAM_COUNT: usize = 3;

/// Evaluate the model at `z`.
pub fn pdf(z: f64, params: &GaussianParams) -> f64 {
    let d = z - params.mu;
    params.c * (-params.lambda * d * d).exp()
}

/// Fill `out` with the partial derivatives of `pdf` at `z`, in `(c, λ, μ)` order.
///
/// # Panics
/// Panics if `out` is shorter than [`PARAM_COUNT`].
pub fn fill_gradient(z: f64, params: &GaussianParams, out: &mut [f64]) {
    let d = z - params.mu;
    let e = (-params.lambda * d * d).exp();
    out[0] = e;
    out[1] = -params.c * d * d * e;
    out[2] = 2.0 * params.c * params.lambda * d * e;
}

/// Sample the model on `n` evenly spaced points over `[lo, hi]`.
pub fn sample_curve(params: &GaussianParams, lo: f64, hi: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let z = lo + u * (hi - lo);
            (z, pdf(z, params))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_peaks_at_mu() {
        let p = GaussianParams::new(2.0, 0.5, 1.0);
        assert_eq!(pdf(1.0, &p), 2.0);
        assert!((pdf(3.0, &p) - 2.0 * (-2.0f64).exp()).abs() < 1e-15);
        assert_eq!(pdf(0.0, &p), pdf(2.0, &p));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let p = GaussianParams::new(1.7, 0.8, -0.3);
        let h = 1e-6;
        for &z in &[-2.0, -0.3, 0.4, 1.9] {
            let mut g = [0.0; PARAM_COUNT];
            fill_gradient(z, &p, &mut g);
            let base = p.as_array();
            for j in 0..PARAM_COUNT {
                let mut up = base;
                let mut dn = base;
                up[j] += h;
                dn[j] -= h;
                let fd = (pdf(z, &GaussianParams::from_slice(&up))
                    - pdf(z, &GaussianParams::from_slice(&dn)))
                    / (2.0 * h);
                assert!((g[j] - fd).abs() < 1e-6, "param {j} at z={z}: {} vs {fd}", g[j]);
            }
        }
    }

    #[test]
    fn sample_curve_spans_endpoints() {
        let p = GaussianParams::new(1.0, 1.0, 0.0);
        let curve = sample_curve(&p, -1.0, 1.0, 500);
        assert_eq!(curve.len(), 500);
        assert_eq!(curve[0].0, -1.0);
        assert_eq!(curve[499].0, 1.0);
    }
}
