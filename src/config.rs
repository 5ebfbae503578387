use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::{PHOTOS_COLUMN, WEIGHT_COLUMN};
use crate::data::translate::TranslationMap;

/// Dashboard settings, read from an optional JSON file. Every field has a
/// default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// JSON object of extra or replacement category labels.
    pub translations_path: Option<PathBuf>,
    /// How many sorted categories start out selected.
    pub default_category_count: usize,
    /// Length of the category bar-chart ranking.
    pub top_categories: usize,
    pub preview_rows: usize,
    /// Columns averaged in the summary.
    pub summary_columns: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("cleaned_products_data.csv"),
            translations_path: None,
            default_category_count: 5,
            top_categories: 10,
            preview_rows: 10,
            summary_columns: vec![WEIGHT_COLUMN.to_string(), PHOTOS_COLUMN.to_string()],
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Built-in translations, overlaid with `translations_path` when set.
    pub fn translations(&self) -> Result<TranslationMap> {
        match &self.translations_path {
            Some(path) => TranslationMap::builtin_with_overrides(path),
            None => Ok(TranslationMap::builtin()),
        }
    }
}
