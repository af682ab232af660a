/// Data layer: core types, loading, statistics and filtering.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json / .parquet bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + infer column types → Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  filter   │   │  stats    │  describe() per column
///   └──────────┘   └──────────┘
///        │
///        ▼
///   chart / export
/// ```

pub mod filter;
pub mod format;
pub mod loader;
pub mod model;
pub mod stats;
