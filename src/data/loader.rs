use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};

use super::model::{Cell, ScanTable};
use crate::error::HvScanError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an HV scan CSV into a [`ScanTable`].
///
/// Layout: the first row holds column names, every further row holds one
/// reading per column. Blank header cells drop their whole column. Data cells
/// are read as:
/// * empty            → missing
/// * integer `-1`     → missing (the lab sheets use it to flag bad readings)
/// * any other number → that value
///
/// Anything else aborts the load with the offending row and column.
pub fn load_scan(path: &Path, signal_prefix: &str) -> Result<ScanTable> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| HvScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    read_scan(reader, signal_prefix).with_context(|| format!("loading {}", path.display()))
}

/// Same as [`load_scan`], from any reader.
pub fn read_scan<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    signal_prefix: &str,
) -> Result<ScanTable> {
    let mut records = reader.records();

    let Some(first) = records.next() else {
        log::warn!("scan file is empty");
        return Ok(ScanTable::default());
    };
    let first = first.context("reading header row")?;

    // Keep the file position of every non-blank header.
    let layout: Vec<(usize, String)> = first
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty())
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let headers: Vec<String> = layout.iter().map(|(_, h)| h.clone()).collect();
    log::info!("{} column headers: {:?}", headers.len(), headers);

    let mut table = ScanTable::with_headers(headers, signal_prefix);
    let mut cells: Vec<Cell> = Vec::with_capacity(layout.len());

    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV data row {}", row_no + 1))?;
        cells.clear();
        for (pos, header) in &layout {
            let cell = match record.get(*pos) {
                Some(text) => parse_cell(text).ok_or_else(|| HvScanError::ParseCell {
                    row: row_no + 1,
                    column: header.clone(),
                    text: text.to_string(),
                })?,
                None => None,
            };
            cells.push(cell);
        }
        table.push_row(&cells);
    }

    log::debug!("read {} data rows", table.len());
    Ok(table)
}

/// Parse one data cell. The outer `None` is a parse failure, the inner one
/// the missing marker. `inf` and `NaN` spellings are not readings.
fn parse_cell(text: &str) -> Option<Cell> {
    if text.is_empty() {
        return Some(None);
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some((i != -1).then_some(i as f64));
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn every_header_gets_one_cell_per_row() {
        let file = write_csv("HV,led,s1,cosmic\n1400,0,3,4\n1400,1000,,2\n-1500,1000,12\n");
        let table = load_scan(file.path(), "s").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.headers, vec!["HV", "led", "s1", "cosmic"]);
        assert_eq!(table.signal_headers, vec!["s1"]);
        for h in &table.headers {
            assert_eq!(table.column(h).unwrap().len(), 3, "column {h}");
        }
        assert_eq!(table.column("HV").unwrap()[2], Some(-1500.0));
    }

    #[test]
    fn empty_and_minus_one_cells_are_missing() {
        let file = write_csv("HV,s1,s2\n1400,,-1\n1400,2.5,-2\n");
        let table = load_scan(file.path(), "s").unwrap();

        assert_eq!(table.column("s1").unwrap(), &[None, Some(2.5)]);
        assert_eq!(table.column("s2").unwrap(), &[None, Some(-2.0)]);
    }

    #[test]
    fn comma_only_row_is_a_row_of_missing_cells() {
        let file = write_csv("HV,led,s1\n1300,0,1\n,,\n1300,5,9\n");
        let table = load_scan(file.path(), "s").unwrap();

        assert_eq!(table.len(), 3);
        for h in &table.headers {
            let col = table.column(h).unwrap();
            assert_eq!(col.len(), 3, "column {h}");
            assert_eq!(col[1], None, "column {h}");
        }
    }

    #[test]
    fn infinite_and_nan_cells_abort_the_load() {
        let file = write_csv("HV,led,s1\n1300,0,1\n1300,infinity,nan\n");
        let err = load_scan(file.path(), "s").unwrap_err();

        match err.downcast_ref::<HvScanError>() {
            Some(HvScanError::ParseCell { row, column, text }) => {
                assert_eq!(*row, 2);
                assert_eq!(column, "led");
                assert_eq!(text, "infinity");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_header_cells_drop_their_column() {
        let file = write_csv("HV,,s1\n1400,999,7\n");
        let table = load_scan(file.path(), "s").unwrap();

        assert_eq!(table.headers, vec!["HV", "s1"]);
        assert_eq!(table.column("s1").unwrap(), &[Some(7.0)]);
    }

    #[test]
    fn non_numeric_cell_names_row_and_column() {
        let file = write_csv("HV,s1\n1400,3\n1500,abc\n");
        let err = load_scan(file.path(), "s").unwrap_err();

        let parse = err
            .downcast_ref::<HvScanError>()
            .expect("domain error in chain");
        match parse {
            HvScanError::ParseCell { row, column, text } => {
                assert_eq!(*row, 2);
                assert_eq!(column, "s1");
                assert_eq!(text, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scan(&dir.path().join("nope.csv"), "s").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HvScanError>(),
            Some(HvScanError::Read { .. })
        ));
    }

    #[test]
    fn parse_cell_rules() {
        assert_eq!(parse_cell(""), Some(None));
        assert_eq!(parse_cell("-1"), Some(None));
        assert_eq!(parse_cell("-1.0"), Some(Some(-1.0)));
        assert_eq!(parse_cell("42"), Some(Some(42.0)));
        assert_eq!(parse_cell("1e3"), Some(Some(1000.0)));
        assert_eq!(parse_cell("x1"), None);
        for word in ["inf", "-inf", "infinity", "NaN", "nan"] {
            assert_eq!(parse_cell(word), None, "{word}");
        }
    }
}
