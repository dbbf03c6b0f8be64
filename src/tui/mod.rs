//! Ratatui chart window.
//!
//! Shows the histogram of the transformed sample with the fitted density, the
//! terminal counterpart of a plot window. The window stays open until `q` or
//! `Esc` is pressed.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::domain::{CURVE_SAMPLES, GaussianParams};
use crate::error::AppError;
use crate::math::histogram::Histogram;
use crate::models::sample_curve;
use crate::plot::ascii::y_upper;

mod plotters_chart;

use plotters_chart::DensityChart;

/// Everything the window draws, computed once up front.
struct ChartData {
    title: String,
    bars: Vec<(f64, f64)>,
    curve: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    legend: String,
}

/// Open the chart window and block until the user closes it.
pub fn show_chart(title: &str, histogram: &Histogram, params: &GaussianParams) -> Result<(), AppError> {
    let data = chart_data(title, histogram, params);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::Render(format!("Failed to initialize terminal: {e}")))?;

    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(f, &data))
                .map_err(|e| AppError::Render(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100))
            .map_err(|e| AppError::Render(format!("Event poll error: {e}")))?
        {
            continue;
        }

        match event::read().map_err(|e| AppError::Render(format!("Event read error: {e}")))? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }
    Ok(())
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Render(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn chart_data(title: &str, histogram: &Histogram, params: &GaussianParams) -> ChartData {
    let (z_min, z_max) = histogram.range();
    let curve: Vec<(f64, f64)> = sample_curve(params, z_min, z_max, CURVE_SAMPLES)
        .into_iter()
        .filter(|(_, y)| y.is_finite())
        .collect();
    let y_max = y_upper(histogram, &curve);

    ChartData {
        title: title.to_string(),
        bars: histogram_outline(histogram),
        curve,
        x_bounds: [z_min, z_max],
        y_bounds: [0.0, y_max],
        legend: format!(
            "Transformed Data (z): blue   Learned PDF: red   c={:.6} lambda={:.6} mu={:.6}",
            params.c, params.lambda, params.mu
        ),
    }
}

/// Step outline tracing the top of every bar, starting and ending on the axis.
fn histogram_outline(histogram: &Histogram) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(histogram.bins.len() * 2 + 2);
    let (z_min, z_max) = histogram.range();
    out.push((z_min, 0.0));
    for bin in &histogram.bins {
        out.push((bin.left, bin.density));
        out.push((bin.right, bin.density));
    }
    out.push((z_max, 0.0));
    out
}

fn draw(f: &mut Frame, data: &ChartData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", data.title));
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);
    f.render_widget(
        DensityChart {
            bars: &data.bars,
            curve: &data.curve,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "z",
            y_label: "Probability Density",
        },
        inner,
    );

    let footer = Paragraph::new(vec![
        Line::from(data.legend.as_str()),
        Line::from("q/Esc: close"),
    ])
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, chunks[1]);
}
