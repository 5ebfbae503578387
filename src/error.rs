use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::ColumnKind;

/// Column lookups that callers are expected to recover from
/// (e.g. by disabling the dependent chart).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("column '{0}' not found")]
    Unknown(String),

    #[error("column '{column}' is {kind:?}, expected a numeric column")]
    NotNumeric { column: String, kind: ColumnKind },

    #[error("column '{0}' cannot be used to group points")]
    NotGroupable(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    Ragged {
        column: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {name} range: lower bound {lo} exceeds upper bound {hi}")]
    InvertedRange { name: &'static str, lo: f64, hi: f64 },

    #[error("{name} range bound is not a finite number")]
    NonFiniteBound { name: &'static str },

    #[error("translation file {path} must contain a JSON object of strings")]
    BadTranslations { path: PathBuf },
}
