mod app;
mod color;
mod config;
mod data;
mod error;
mod plot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueHint};

use app::HvScan;
use config::Config;
use plot::PngSink;

/// Reduce a PMT high-voltage scan: background-subtracted rates per LED
/// trigger versus HV, plus raw-data and baseline-rate figures.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Scan CSV (defaults to the configured input).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Directory figures are written to.
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// JSON config file; command-line values take precedence.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config()?;
    log::debug!("config: {config:?}");

    let mut scan = HvScan::load(config)?;
    log::info!(
        "{} rows, {} signal channels: {:?}",
        scan.table.len(),
        scan.table.signal_headers.len(),
        scan.table.signal_headers
    );

    let mut sink = PngSink::new();
    let written = scan.run(&mut sink)?;
    log::info!(
        "{} figures ({} graphs) in {}",
        written.len(),
        scan.graphs.len(),
        scan.config.output_dir.display()
    );
    Ok(())
}
