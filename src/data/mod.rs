/// Data layer: table model, loading, filtering and derived statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ProductTable (+ translated category column)
///   └──────────┘   cached per path + mtime as Arc<ProductTable>
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category / weight / photo predicates → FilteredView
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐  ┌─────────────┐  ┌──────────┐
///   │ summary   │  │ correlation  │  │  export   │
///   └──────────┘  └─────────────┘  └──────────┘
/// ```

pub mod correlation;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
pub mod translate;
