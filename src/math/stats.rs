//! Summary statistics used to seed the optimizer.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by `n`, not `n - 1`).
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / values.len() as f64)
}

/// Minimum and maximum. A NaN anywhere yields `(NaN, NaN)`.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    let mut lo = first;
    let mut hi = first;
    for &v in values {
        if v.is_nan() {
            return Some((f64::NAN, f64::NAN));
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}
