/// Data layer: observation tables, loading, and scaling.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ObservationTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ObservationTable│  Vec<Vec<f64>>, column names
///   └────────────────┘
///        │  select two columns
///        ▼
///   ┌──────────┐
///   │PointCloud │──► scale (optional standardisation)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod scale;
