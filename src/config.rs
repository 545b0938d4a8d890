use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Scan file read when no input is given.
pub const DEFAULT_INPUT: &str = "HVscan_20151230.csv";
/// Figure directory used when none is given.
pub const DEFAULT_FIG_DIR: &str = "Figures/HVscan/";

// ---------------------------------------------------------------------------
// Config – everything a run needs, passed explicitly
// ---------------------------------------------------------------------------

/// Run configuration. Every field has a default, so a JSON config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan CSV to reduce.
    pub input_path: PathBuf,
    /// Where figures are written.
    pub output_dir: PathBuf,
    pub columns: ColumnNames,
    /// Length of one counting window; raw counts are divided by it to get
    /// rates per second.
    pub counting_window_secs: f64,
    /// Baseline-rate histograms drawn by the info pass.
    pub info_histograms: Vec<InfoHistogram>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_FIG_DIR),
            columns: ColumnNames::default(),
            counting_window_secs: 10.0,
            info_histograms: vec![
                InfoHistogram::new("cosmic", 15, -0.05, 1.45),
                InfoHistogram::new("led", 40, 995.0, 1005.0),
            ],
        }
    }
}

impl Config {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Names of the columns the analysis depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub hv: String,
    pub led: String,
    /// Headers starting with this prefix are signal channels.
    pub signal_prefix: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            hv: "HV".to_string(),
            led: "led".to_string(),
            signal_prefix: "s".to_string(),
        }
    }
}

/// Binning for one baseline-rate histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoHistogram {
    pub column: String,
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

impl InfoHistogram {
    pub fn new(column: &str, bins: usize, min: f64, max: f64) -> Self {
        Self {
            column: column.to_string(),
            bins,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "input_path": "scan.csv", "columns": {{ "led": "LED" }} }}"#
        )
        .unwrap();

        let cfg = Config::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.input_path, PathBuf::from("scan.csv"));
        assert_eq!(cfg.output_dir, PathBuf::from(DEFAULT_FIG_DIR));
        assert_eq!(cfg.columns.led, "LED");
        assert_eq!(cfg.columns.hv, "HV");
        assert_eq!(cfg.info_histograms.len(), 2);
    }

    #[test]
    fn default_histogram_binning() {
        let cfg = Config::default();
        assert_eq!(cfg.info_histograms[0], InfoHistogram::new("cosmic", 15, -0.05, 1.45));
        assert_eq!(cfg.info_histograms[1], InfoHistogram::new("led", 40, 995.0, 1005.0));
    }

    #[test]
    fn bad_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::from_json_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
