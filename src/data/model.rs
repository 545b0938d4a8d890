use std::collections::BTreeMap;

use crate::config::ColumnNames;
use crate::error::HvScanError;

// ---------------------------------------------------------------------------
// Cell – a single measurement
// ---------------------------------------------------------------------------

/// One table cell. `None` marks a missing or explicitly invalid reading, so
/// a genuine measurement can never collide with the marker.
pub type Cell = Option<f64>;

// ---------------------------------------------------------------------------
// ScanTable – the ingested file, column oriented
// ---------------------------------------------------------------------------

/// Column-oriented view of a scan file. Every header in `headers` has an
/// entry in `columns`, and all columns hold exactly `rows` cells.
#[derive(Debug, Clone, Default)]
pub struct ScanTable {
    /// Header names in file order (blank header cells omitted).
    pub headers: Vec<String>,
    /// Subset of `headers` that are signal channels, in file order.
    pub signal_headers: Vec<String>,
    /// column name → cells, one per data row.
    pub columns: BTreeMap<String, Vec<Cell>>,
    rows: usize,
}

impl ScanTable {
    /// Create an empty table with the given headers.
    pub fn with_headers(headers: Vec<String>, signal_prefix: &str) -> Self {
        let signal_headers = headers
            .iter()
            .filter(|h| !signal_prefix.is_empty() && h.starts_with(signal_prefix))
            .cloned()
            .collect();
        let columns = headers.iter().map(|h| (h.clone(), Vec::new())).collect();
        ScanTable {
            headers,
            signal_headers,
            columns,
            rows: 0,
        }
    }

    /// Append one row. `cells` is indexed like `headers`; missing trailing
    /// cells are padded, surplus cells are ignored.
    pub fn push_row(&mut self, cells: &[Cell]) {
        for (i, header) in self.headers.iter().enumerate() {
            let cell = cells.get(i).copied().flatten();
            if let Some(col) = self.columns.get_mut(header) {
                col.push(cell);
            }
        }
        self.rows += 1;
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Look up a column that the analysis cannot do without.
    pub fn require(&self, name: &str) -> Result<&[Cell], HvScanError> {
        self.column(name).ok_or_else(|| HvScanError::MissingColumn {
            column: name.to_string(),
            found: self.headers.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Schema – the named columns every pass relies on
// ---------------------------------------------------------------------------

/// Required columns, resolved once right after ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// High-voltage setting column.
    pub hv: String,
    /// LED trigger indicator / count column.
    pub led: String,
}

impl Schema {
    /// Check that the configured HV and LED columns exist in `table`.
    pub fn resolve(table: &ScanTable, names: &ColumnNames) -> Result<Self, HvScanError> {
        table.require(&names.hv)?;
        table.require(&names.led)?;
        Ok(Schema {
            hv: names.hv.clone(),
            led: names.led.clone(),
        })
    }
}

/// Absolute HV readings of a column, keeping missing cells missing.
pub fn abs_hv(hv: &[Cell]) -> Vec<Cell> {
    hv.iter().map(|c| c.map(f64::abs)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ScanTable {
        ScanTable::with_headers(
            vec!["HV".into(), "led".into(), "s1".into(), "cosmic".into(), "s2".into()],
            "s",
        )
    }

    #[test]
    fn signal_headers_follow_prefix_in_file_order() {
        let t = table();
        assert_eq!(t.signal_headers, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let mut t = table();
        t.push_row(&[Some(1.0), Some(2.0)]);
        t.push_row(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0)]);
        assert_eq!(t.len(), 2);
        for h in &t.headers {
            assert_eq!(t.column(h).unwrap().len(), 2, "column {h}");
        }
        assert_eq!(t.column("s2").unwrap(), &[None, Some(5.0)]);
    }

    #[test]
    fn schema_reports_missing_column_with_found_headers() {
        let t = ScanTable::with_headers(vec!["HV".into(), "s1".into()], "s");
        let err = Schema::resolve(&t, &ColumnNames::default()).unwrap_err();
        match err {
            HvScanError::MissingColumn { column, found } => {
                assert_eq!(column, "led");
                assert_eq!(found, vec!["HV".to_string(), "s1".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn abs_hv_flips_negative_settings() {
        assert_eq!(abs_hv(&[Some(-1500.0), None, Some(1400.0)]), vec![
            Some(1500.0),
            None,
            Some(1400.0)
        ]);
    }
}
