/// Data layer: ingestion, filtering and rate reduction.
///
/// Architecture:
/// ```text
///     scan .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse cells → ScanTable (missing = None)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ ScanTable  │  columns by header, signal headers, Schema
///   └───────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  filter   │   │   rate    │  group by |HV| → RateSeries
///   └──────────┘   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod rate;
