/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .xlsx / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → raw cells → Column::infer
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Column>, kind decided once per column
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
