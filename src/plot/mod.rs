/// Presentation layer: figure descriptions and the sinks that consume them.
///
/// ```text
///   HvScan passes
///        │  ScatterPlot / Overlay / HistogramPanel
///        ▼
///   ┌────────────┐
///   │ FigureSink │  queue figures
///   └────────────┘
///        │  render(dir)
///        ▼
///   <name>.png files (PngSink)
/// ```
use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::style::RGBColor;

pub mod histogram;
pub mod png;

pub use histogram::Histogram1D;
pub use png::PngSink;

/// File-system friendly figure name: the title with spaces as underscores.
pub fn figure_name(title: &str) -> String {
    title.replace(' ', "_")
}

// ---------------------------------------------------------------------------
// Figure descriptions
// ---------------------------------------------------------------------------

/// Points with optional error bars.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub name: String,
    pub title: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub x_err: Option<Vec<f64>>,
    pub y_err: Option<Vec<f64>>,
    pub x_label: String,
    pub y_label: String,
    pub color: RGBColor,
}

impl ScatterPlot {
    /// Plain scatter plot; the name is derived from the title.
    pub fn new(title: &str, x: Vec<f64>, y: Vec<f64>, color: RGBColor) -> Self {
        ScatterPlot {
            name: figure_name(title),
            title: title.to_string(),
            x,
            y,
            x_err: None,
            y_err: None,
            x_label: String::new(),
            y_label: String::new(),
            color,
        }
    }

    pub fn with_errors(mut self, x_err: Vec<f64>, y_err: Vec<f64>) -> Self {
        self.x_err = Some(x_err);
        self.y_err = Some(y_err);
        self
    }

    pub fn with_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }
}

/// Several scatter plots drawn on shared axes with a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub members: Vec<ScatterPlot>,
}

impl Overlay {
    pub fn new(name: &str) -> Self {
        Overlay {
            name: name.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            members: Vec::new(),
        }
    }

    pub fn add(&mut self, plot: ScatterPlot) {
        self.members.push(plot);
    }
}

/// Histograms drawn side by side in one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPanel {
    pub name: String,
    pub histograms: Vec<Histogram1D>,
}

/// Anything a sink can be asked to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Scatter(ScatterPlot),
    Overlay(Overlay),
    Histograms(HistogramPanel),
}

impl Figure {
    pub fn name(&self) -> &str {
        match self {
            Figure::Scatter(p) => &p.name,
            Figure::Overlay(o) => &o.name,
            Figure::Histograms(h) => &h.name,
        }
    }
}

// ---------------------------------------------------------------------------
// FigureSink
// ---------------------------------------------------------------------------

/// Destination for figures. Passes hand figures over as they are built;
/// nothing touches the file system until [`FigureSink::render`].
pub trait FigureSink {
    /// Queue one figure.
    fn submit(&mut self, figure: Figure);

    /// Write every queued figure into `dir`, returning the files written.
    fn render(&mut self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn scatter(&mut self, plot: ScatterPlot) {
        self.submit(Figure::Scatter(plot));
    }

    fn overlay(&mut self, overlay: Overlay) {
        self.submit(Figure::Overlay(overlay));
    }

    fn histograms(&mut self, panel: HistogramPanel) {
        self.submit(Figure::Histograms(panel));
    }
}

/// Sink that only records what it was given.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub figures: Vec<Figure>,
    pub rendered_to: Vec<PathBuf>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn get(&self, name: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.name() == name)
    }
}

#[cfg(test)]
impl FigureSink for RecordingSink {
    fn submit(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    fn render(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.rendered_to.push(dir.to_path_buf());
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_replace_spaces() {
        assert_eq!(figure_name("s1 rate per LED trigger"), "s1_rate_per_LED_trigger");
        let p = ScatterPlot::new("s2 raw data", vec![], vec![], RGBColor(0, 0, 0));
        assert_eq!(Figure::Scatter(p).name(), "s2_raw_data");
    }
}
