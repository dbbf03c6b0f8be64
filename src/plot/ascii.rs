//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - histogram bars: `#`
//! - fitted density: `*` line (drawn on top of the bars)

use crate::domain::GaussianParams;
use crate::math::histogram::Histogram;
use crate::models::sample_curve;

/// Render the histogram with the fitted curve overlaid.
pub fn render_ascii_plot(
    histogram: &Histogram,
    params: &GaussianParams,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(4);
    let height = height.max(3);

    let (z_min, z_max) = histogram.range();
    let curve = sample_curve(params, z_min, z_max, width.max(2));
    let y_max = y_upper(histogram, &curve);

    let mut grid = vec![vec![' '; width]; height];

    // Bars first so the curve stays visible on top.
    let n_bins = histogram.bins.len();
    for col in 0..width {
        let z = z_min + (col as f64 + 0.5) / width as f64 * (z_max - z_min);
        let u = ((z - z_min) / (z_max - z_min)).clamp(0.0, 1.0);
        let bin = &histogram.bins[((u * n_bins as f64) as usize).min(n_bins - 1)];
        if bin.count == 0 {
            continue;
        }
        let top = map_y(bin.density, y_max, height);
        for row in grid.iter_mut().skip(top) {
            row[col] = '#';
        }
    }

    let mut prev = None;
    for &(z, y) in &curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(z, z_min, z_max, width);
        let yy = map_y(y, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, '*'),
            None => grid[yy][x] = '*',
        }
        prev = Some((x, yy));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: z=[{z_min:.3}, {z_max:.3}] | density=[0, {y_max:.4}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Upper y bound covering bars and curve, padded by 5%.
pub(crate) fn y_upper(histogram: &Histogram, curve: &[(f64, f64)]) -> f64 {
    let peak = curve
        .iter()
        .map(|&(_, y)| y)
        .filter(|y| y.is_finite())
        .fold(histogram.max_density(), f64::max);
    if peak.is_finite() && peak > 0.0 {
        peak * 1.05
    } else {
        1.0
    }
}

fn map_x(z: f64, z_min: f64, z_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((z - z_min) / (z_max - z_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
