//! Equal-width density histogram.
//!
//! The range `[min, max]` of the sample is split into `bins` equal-width bins.
//! Every bin is half-open `[left, right)` except the last, which also contains
//! `max`. Each bin reports a density `count / (n * width)`, so the histogram
//! integrates to one over the full range.
//!
//! Bin assignment uses the scaled index `floor((x - min) / (max - min) * bins)`
//! and then corrects it against the stored edges, so values that land exactly
//! on an interior edge always fall into the right-hand bin even when the
//! scaled index rounds the other way.

use crate::error::AppError;
use crate::math::stats::min_max;

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub left: f64,
    pub right: f64,
    pub count: usize,
    pub density: f64,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// A normalized histogram of a sample.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    pub n_samples: usize,
}

impl Histogram {
    /// Build a density histogram with `n_bins` equal-width bins.
    ///
    /// Fails with `EmptyData` for an empty sample and with `InvalidRange` when
    /// the range is zero-width or not finite.
    pub fn density(values: &[f64], n_bins: usize) -> Result<Self, AppError> {
        if n_bins == 0 {
            return Err(AppError::InvalidConfig("histogram needs at least one bin".to_string()));
        }
        let Some((min, max)) = min_max(values) else {
            return Err(AppError::EmptyData {
                column: "transformed sample".to_string(),
            });
        };
        if !(min.is_finite() && max.is_finite()) || max <= min {
            return Err(AppError::InvalidRange { min, max });
        }

        let edges = bin_edges(min, max, n_bins);
        let mut counts = vec![0usize; n_bins];
        for &v in values {
            counts[bin_index(v, &edges)] += 1;
        }

        let n = values.len() as f64;
        let bins = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let (left, right) = (edges[i], edges[i + 1]);
                HistogramBin {
                    left,
                    right,
                    count,
                    density: count as f64 / (n * (right - left)),
                }
            })
            .collect();

        Ok(Self {
            bins,
            n_samples: values.len(),
        })
    }

    pub fn centers(&self) -> Vec<f64> {
        self.bins.iter().map(HistogramBin::center).collect()
    }

    pub fn densities(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.density).collect()
    }

    pub fn max_density(&self) -> f64 {
        self.bins.iter().map(|b| b.density).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lower and upper edge of the covered range.
    pub fn range(&self) -> (f64, f64) {
        let left = self.bins.first().map(|b| b.left).unwrap_or(f64::NAN);
        let right = self.bins.last().map(|b| b.right).unwrap_or(f64::NAN);
        (left, right)
    }

    /// `Σ density_i * width_i`, one for any non-empty histogram.
    pub fn area(&self) -> f64 {
        self.bins.iter().map(|b| b.density * b.width()).sum()
    }
}

fn bin_edges(min: f64, max: f64, n_bins: usize) -> Vec<f64> {
    let step = (max - min) / n_bins as f64;
    let mut edges: Vec<f64> = (0..=n_bins).map(|i| min + i as f64 * step).collect();
    edges[n_bins] = max;
    edges
}

fn bin_index(v: f64, edges: &[f64]) -> usize {
    let n_bins = edges.len() - 1;
    let (first, last) = (edges[0], edges[n_bins]);

    let scaled = (v - first) / (last - first) * n_bins as f64;
    let mut idx = (scaled as usize).min(n_bins - 1);

    if idx > 0 && v < edges[idx] {
        idx -= 1;
    }
    if idx + 1 < n_bins && v >= edges[idx + 1] {
        idx += 1;
    }
    idx
}
