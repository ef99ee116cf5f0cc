/// Data layer: table model, loading, and column classification.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse bytes → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Column>, equal row counts
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify │  column types → numerical / categorical
///   └──────────┘
/// ```

pub mod classify;
pub mod loader;
pub mod model;
