use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while ingesting a scan file or resolving its columns.
#[derive(Debug, Error)]
pub enum HvScanError {
    #[error("cannot read scan file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("data row {row}, column '{column}': '{text}' is not a number")]
    ParseCell {
        row: usize,
        column: String,
        text: String,
    },

    #[error("required column '{column}' not found (headers: {found:?})")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("rendering '{figure}' failed: {reason}")]
    Render { figure: String, reason: String },
}
