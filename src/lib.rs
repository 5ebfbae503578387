//! Product catalogue exploration: load a product table once, filter it by
//! category, weight and photo count, and derive summaries, category
//! rankings, correlations, scatter extracts and exports from the result.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use config::DashboardConfig;
pub use data::filter::{filter, FilterParams, FilteredView, Interval};
pub use data::loader::{load_file, DatasetCache};
pub use data::model::ProductTable;
pub use data::translate::TranslationMap;
pub use error::{ColumnError, ConfigError};
pub use state::{compute_snapshot, DashboardSnapshot, DashboardState};
