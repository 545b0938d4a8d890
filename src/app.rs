use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::color::series_color;
use crate::config::Config;
use crate::data::filter::{non_negative, winnow};
use crate::data::loader::load_scan;
use crate::data::model::{abs_hv, ScanTable, Schema};
use crate::data::rate::{calc_rate, RateSeries};
use crate::plot::{figure_name, FigureSink, Histogram1D, HistogramPanel, Overlay, ScatterPlot};

const HV_AXIS: &str = "HV(volts)";
const RATE_AXIS: &str = "rate per LED trigger";
const NORMED_RATE_AXIS: &str = "normed rate per LED trigger";

// ---------------------------------------------------------------------------
// HvScan – one reduction run
// ---------------------------------------------------------------------------

/// A loaded HV scan and the plots made from it.
pub struct HvScan {
    pub config: Config,
    pub table: ScanTable,
    pub schema: Schema,
    /// Every scatter plot made during the run, by figure name.
    pub graphs: BTreeMap<String, ScatterPlot>,
}

impl HvScan {
    /// Ingest `config.input_path` and resolve the required columns.
    pub fn load(config: Config) -> Result<Self> {
        let table = load_scan(&config.input_path, &config.columns.signal_prefix)?;
        let schema = Schema::resolve(&table, &config.columns)
            .with_context(|| format!("checking columns of {}", config.input_path.display()))?;
        Ok(Self::from_table(config, table, schema))
    }

    pub fn from_table(config: Config, table: ScanTable, schema: Schema) -> Self {
        HvScan {
            config,
            table,
            schema,
            graphs: BTreeMap::new(),
        }
    }

    /// Run the info, raw and rate passes and render everything.
    pub fn run(&mut self, sink: &mut dyn FigureSink) -> Result<Vec<PathBuf>> {
        self.plot_info(sink);
        self.plot_raw(sink)?;
        self.plot_rate(sink)?;
        sink.render(&self.config.output_dir)
    }

    fn abs_hv(&self) -> Result<Vec<Option<f64>>> {
        Ok(abs_hv(self.table.require(&self.schema.hv)?))
    }

    fn color(&self, index: usize) -> plotters::style::RGBColor {
        series_color(index, self.table.headers.len())
    }

    fn keep(&mut self, plot: ScatterPlot, sink: &mut dyn FigureSink) {
        self.graphs.insert(plot.name.clone(), plot.clone());
        sink.scatter(plot);
    }

    /// Counts per window against |HV| for every column but HV itself.
    pub fn plot_raw(&mut self, sink: &mut dyn FigureSink) -> Result<()> {
        let hv = self.abs_hv()?;
        let headers = self.table.headers.clone();

        for (icol, header) in headers.iter().enumerate() {
            if *header == self.schema.hv {
                continue;
            }
            let (x, y) = winnow(&hv, self.table.require(header)?);
            let title = format!("{header} raw data");
            let plot = ScatterPlot::new(&title, x, y, self.color(icol)).with_labels(HV_AXIS, "counts");
            self.keep(plot, sink);
        }
        Ok(())
    }

    /// Background-subtracted rate per LED trigger for every signal column,
    /// each drawn alone and in the absolute and peak-normalised overlays.
    pub fn plot_rate(&mut self, sink: &mut dyn FigureSink) -> Result<()> {
        let mut rates = Overlay::new("bkgd_sub_rates");
        rates.x_label = HV_AXIS.to_string();
        rates.y_label = RATE_AXIS.to_string();
        let mut normed = Overlay::new("normed_bkgd_sub_rates");
        normed.x_label = HV_AXIS.to_string();
        normed.y_label = NORMED_RATE_AXIS.to_string();

        let hv = self.abs_hv()?;
        let led = self.table.require(&self.schema.led)?.to_vec();
        let headers = self.table.headers.clone();

        for (icol, header) in headers.iter().enumerate() {
            if !self.table.signal_headers.contains(header) {
                continue;
            }
            let series = calc_rate(&hv, self.table.require(header)?, &led, header);
            if series.is_empty() {
                log::warn!("{header}: no HV setting yields a rate");
                continue;
            }

            let plot = self.rate_plot(&format!("{header} {RATE_AXIS}"), &series, icol, RATE_AXIS);
            rates.add(plot.clone());
            self.keep(plot, sink);

            let Some(scaled) = series.normalized() else {
                log::warn!("{header}: peak rate {:?} cannot be normalised", series.peak());
                continue;
            };
            let plot = self.rate_plot(
                &format!("{header} {NORMED_RATE_AXIS}"),
                &scaled,
                icol,
                NORMED_RATE_AXIS,
            );
            normed.add(plot.clone());
            self.keep(plot, sink);
        }

        sink.overlay(rates);
        sink.overlay(normed);
        Ok(())
    }

    fn rate_plot(&self, title: &str, series: &RateSeries, icol: usize, y_label: &str) -> ScatterPlot {
        ScatterPlot::new(title, series.x.clone(), series.y.clone(), self.color(icol))
            .with_errors(series.x_err.clone(), series.y_err.clone())
            .with_labels(HV_AXIS, y_label)
    }

    /// Histograms of the baseline rates (counts per window / window length).
    pub fn plot_info(&self, sink: &mut dyn FigureSink) {
        let window = self.config.counting_window_secs;
        let mut histograms = Vec::new();

        for spec in &self.config.info_histograms {
            let Some(values) = self.table.column(&spec.column) else {
                log::warn!("info column '{}' not in file, histogram skipped", spec.column);
                continue;
            };
            let title = format!("{} rate per sec", spec.column);
            let mut hist = Histogram1D::new(&title, spec.bins, spec.min, spec.max);
            for v in non_negative(values) {
                hist.fill(v / window);
            }
            log::debug!(
                "{}: {} entries, {} underflow, {} overflow",
                hist.name,
                hist.entries(),
                hist.underflow,
                hist.overflow
            );
            histograms.push(hist);
        }

        if histograms.is_empty() {
            return;
        }
        let names: Vec<&str> = histograms.iter().map(|h| h.name.as_str()).collect();
        sink.histograms(HistogramPanel {
            name: figure_name(&names.join(" ")),
            histograms,
        });
    }
}
