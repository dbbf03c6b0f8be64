//! SVG chart export via Plotters.
//!
//! Same picture as the chart window: filled histogram bars of the transformed
//! sample with the fitted density drawn on top, written to a file instead of a
//! terminal.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{CURVE_SAMPLES, GaussianParams};
use crate::error::AppError;
use crate::math::histogram::Histogram;
use crate::models::sample_curve;
use crate::plot::ascii::y_upper;

const SIZE: (u32, u32) = (1000, 600);

fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(e.to_string())
}

/// Write the histogram + fitted curve chart to `path` as SVG.
pub fn save_svg_plot(
    path: &Path,
    histogram: &Histogram,
    params: &GaussianParams,
    title: &str,
) -> Result<(), AppError> {
    let (z_min, z_max) = histogram.range();
    let curve = sample_curve(params, z_min, z_max, CURVE_SAMPLES);
    let y_max = y_upper(histogram, &curve);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(z_min..z_max, 0.0..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("z")
        .y_desc("Probability Density")
        .x_labels(10)
        .y_labels(8)
        .draw()
        .map_err(render_err)?;

    let bar_style = RGBColor(135, 206, 235).mix(0.6).filled(); // skyblue
    chart
        .draw_series(histogram.bins.iter().map(|b| {
            Rectangle::new([(b.left, 0.0), (b.right, b.density)], bar_style)
        }))
        .map_err(render_err)?
        .label("Transformed Data (z)")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], bar_style));

    let curve_style = RED.stroke_width(2);
    chart
        .draw_series(LineSeries::new(
            curve.iter().copied().filter(|(_, y)| y.is_finite()),
            curve_style,
        ))
        .map_err(render_err)?
        .label("Learned PDF")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], curve_style));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
