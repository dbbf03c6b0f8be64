//! Identifier-keyed sinusoidal perturbation.
//!
//! Each identifier `r` selects two constants
//!
//! ```text
//! a = 0.05 * (r mod 7)
//! b = 0.3  * ((r mod 5) + 1)
//! ```
//!
//! and every raw value is mapped to `z = x + a * sin(b * x)`. The mapping is a
//! pure function of `(r, x)`, so two runs with the same identifier see the same
//! transformed sample.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Perturbation constants derived from an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    /// Amplitude of the sinusoidal term.
    pub a: f64,
    /// Angular frequency of the sinusoidal term.
    pub b: f64,
}

impl Perturbation {
    /// Derive `(a, b)` from a non-negative identifier.
    ///
    /// Negative identifiers are rejected instead of depending on the sign
    /// convention of the remainder operator.
    pub fn from_identifier(identifier: i64) -> Result<Self, AppError> {
        if identifier < 0 {
            return Err(AppError::InvalidIdentifier(format!(
                "{identifier} (identifiers must be non-negative)"
            )));
        }
        let a = 0.05 * (identifier % 7) as f64;
        let b = 0.3 * ((identifier % 5) + 1) as f64;
        Ok(Self { a, b })
    }

    pub fn apply(&self, x: f64) -> f64 {
        x + self.a * (self.b * x).sin()
    }

    /// Map a raw sample element-wise, preserving length and order.
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.apply(x)).collect()
    }

    pub fn is_identity(&self) -> bool {
        self.a == 0.0
    }
}

/// Parse an identifier typed by a user.
pub fn parse_identifier(input: &str) -> Result<i64, AppError> {
    let input = input.trim();
    let identifier = input
        .parse::<i64>()
        .map_err(|_| AppError::InvalidIdentifier(format!("'{input}' is not an integer")))?;
    if identifier < 0 {
        return Err(AppError::InvalidIdentifier(format!(
            "{identifier} (identifiers must be non-negative)"
        )));
    }
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_direct_computation() {
        let cases: [(i64, f64, f64); 6] = [
            (0, 0.0, 0.3),
            (1, 0.05, 0.6),
            (5, 0.25, 0.3),
            (6, 0.30, 0.6),
            (7, 0.0, 0.9),
            (34, 0.30, 1.5),
        ];
        for (r, a, b) in cases {
            let p = Perturbation::from_identifier(r).unwrap();
            assert_eq!(p.a, 0.05 * (r % 7) as f64, "a for r={r}");
            assert_eq!(p.b, 0.3 * ((r % 5) + 1) as f64, "b for r={r}");
            assert!((p.a - a).abs() < 1e-12, "a for r={r}: {}", p.a);
            assert!((p.b - b).abs() < 1e-12, "b for r={r}: {}", p.b);
        }
    }

    #[test]
    fn multiples_of_seven_leave_values_untouched() {
        let xs = [-12.5, 0.0, 1.0, 3.25, 48.0, 1e6];
        for r in [0, 7, 14, 35, 700] {
            let p = Perturbation::from_identifier(r).unwrap();
            assert!(p.is_identity());
            assert_eq!(p.transform(&xs), xs.to_vec());
        }
    }

    #[test]
    fn transform_applies_sinusoid_elementwise() {
        let p = Perturbation::from_identifier(3).unwrap();
        let xs = [0.0, 1.0, 2.0];
        let zs = p.transform(&xs);
        assert_eq!(zs.len(), xs.len());
        for (x, z) in xs.iter().zip(&zs) {
            assert_eq!(*z, x + (0.05 * 3.0) * ((0.3 * 4.0) * x).sin());
        }
    }

    #[test]
    fn empty_sample_maps_to_empty() {
        let p = Perturbation::from_identifier(12).unwrap();
        assert!(p.transform(&[]).is_empty());
    }

    #[test]
    fn negative_identifier_is_rejected() {
        let err = Perturbation::from_identifier(-3).unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier(_)));
    }

    #[test]
    fn parse_identifier_trims_and_validates() {
        assert_eq!(parse_identifier(" 42\n").unwrap(), 42);
        assert!(parse_identifier("abc").is_err());
        assert!(parse_identifier("-1").is_err());
    }
}
