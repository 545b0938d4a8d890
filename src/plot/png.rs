use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{Figure, FigureSink, Histogram1D, HistogramPanel, Overlay, ScatterPlot};
use crate::error::HvScanError;

type DrawResult = std::result::Result<(), Box<dyn Error>>;
type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FIGURE_SIZE: (u32, u32) = (1000, 700);
const HIST_PANEL_SIZE: (u32, u32) = (700, 600);

// ---------------------------------------------------------------------------
// PngSink – renders queued figures with plotters
// ---------------------------------------------------------------------------

/// Writes each queued figure to `<dir>/<name>.png`.
#[derive(Debug, Default)]
pub struct PngSink {
    queue: Vec<Figure>,
}

impl PngSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FigureSink for PngSink {
    fn submit(&mut self, figure: Figure) {
        self.queue.push(figure);
    }

    fn render(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating figure directory {}", dir.display()))?;

        let mut written = Vec::with_capacity(self.queue.len());
        for figure in self.queue.drain(..) {
            let path = dir.join(format!("{}.png", figure.name()));
            let drawn = match &figure {
                Figure::Scatter(plot) => draw_scatter(&path, plot),
                Figure::Overlay(overlay) => draw_overlay(&path, overlay),
                Figure::Histograms(panel) => draw_histograms(&path, panel),
            };
            drawn.map_err(|e| HvScanError::Render {
                figure: figure.name().to_string(),
                reason: e.to_string(),
            })?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Scatter / overlay
// ---------------------------------------------------------------------------

fn draw_scatter(path: &Path, plot: &ScatterPlot) -> DrawResult {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_range, y_range) = plot_bounds(std::slice::from_ref(plot));
    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&plot.x_label)
        .y_desc(&plot.y_label)
        .draw()?;

    draw_points(&mut chart, plot, false)?;
    root.present()?;
    Ok(())
}

fn draw_overlay(path: &Path, overlay: &Overlay) -> DrawResult {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_range, y_range) = plot_bounds(&overlay.members);
    let mut chart = ChartBuilder::on(&root)
        .caption(&overlay.name, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&overlay.x_label)
        .y_desc(&overlay.y_label)
        .draw()?;

    for plot in &overlay.members {
        draw_points(&mut chart, plot, true)?;
    }
    if !overlay.members.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_points(chart: &mut Chart<'_, '_>, plot: &ScatterPlot, legend: bool) -> DrawResult {
    let color = plot.color;

    if let Some(y_err) = &plot.y_err {
        chart.draw_series(plot.x.iter().zip(&plot.y).zip(y_err).map(|((x, y), e)| {
            ErrorBar::new_vertical(*x, y - e, *y, y + e, color.stroke_width(1), 6)
        }))?;
    }
    if let Some(x_err) = &plot.x_err {
        chart.draw_series(
            plot.x
                .iter()
                .zip(&plot.y)
                .zip(x_err)
                .filter(|(_, e)| **e > 0.0)
                .map(|((x, y), e)| {
                    ErrorBar::new_horizontal(*y, x - e, *x, x + e, color.stroke_width(1), 6)
                }),
        )?;
    }

    let points = chart.draw_series(
        plot.x
            .iter()
            .zip(&plot.y)
            .map(|(x, y)| Circle::new((*x, *y), 4, color.filled())),
    )?;
    if legend {
        points
            .label(plot.title.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }
    Ok(())
}

/// Axis ranges covering every point and error bar, with a small margin.
fn plot_bounds(plots: &[ScatterPlot]) -> (Range<f64>, Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);

    for plot in plots {
        for (i, (&px, &py)) in plot.x.iter().zip(&plot.y).enumerate() {
            let ex = plot.x_err.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0);
            let ey = plot.y_err.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0);
            x = (x.0.min(px - ex), x.1.max(px + ex));
            y = (y.0.min(py - ey), y.1.max(py + ey));
        }
    }
    (padded(x.0, x.1), padded(y.0, y.1))
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        lo.abs().max(1.0) * 0.05
    };
    (lo - pad)..(hi + pad)
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

fn draw_histograms(path: &Path, panel: &HistogramPanel) -> DrawResult {
    let n = panel.histograms.len().max(1);
    let size = (HIST_PANEL_SIZE.0 * n as u32, HIST_PANEL_SIZE.1);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((1, n));
    for (area, hist) in areas.iter().zip(&panel.histograms) {
        draw_histogram(area, hist)?;
    }
    root.present()?;
    Ok(())
}

fn draw_histogram(area: &DrawingArea<BitMapBackend<'_>, Shift>, hist: &Histogram1D) -> DrawResult {
    let y_max = (hist.max_count() as f64).max(1.0) * 1.1;
    let caption = format!(
        "{} (entries {}, under {}, over {})",
        hist.title,
        hist.entries(),
        hist.underflow,
        hist.overflow
    );

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(hist.min..hist.max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(&hist.title)
        .y_desc("entries")
        .draw()?;

    let width = hist.bin_width();
    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = hist.bin_low(i);
        Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLUE.mix(0.6).filled())
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::RGBColor;

    #[test]
    fn bounds_include_error_bars() {
        let plot = ScatterPlot::new("t", vec![1.0, 3.0], vec![2.0, 4.0], RGBColor(0, 0, 0))
            .with_errors(vec![0.0, 0.0], vec![1.0, 1.0]);
        let (x, y) = plot_bounds(&[plot]);
        assert!(x.start < 1.0 && x.end > 3.0);
        assert!(y.start < 1.0 && y.end > 5.0);
    }

    #[test]
    fn empty_and_single_point_ranges_are_usable() {
        assert_eq!(padded(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
        let r = padded(1500.0, 1500.0);
        assert!(r.start < 1500.0 && r.end > 1500.0);
    }
}
