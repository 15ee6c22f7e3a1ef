/// Data layer: core types, loading, filtering and export.
///
/// Architecture:
/// ```text
///  X_test / y_test / predictions / feature_importance
///        (.csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → EvaluationBundle
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ EvaluationBundle │  ObservationTable, labels, predictions, importances
///   └──────────────────┘
///        │                         │
///        ▼                         ▼
///   ┌──────────┐             ┌──────────┐
///   │  filter   │ indices     │  export   │ source columns + prediction → CSV
///   └──────────┘             └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
