use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{CellValue, ProductTable, CATEGORY_COLUMN, TRANSLATED_COLUMN};

// ---------------------------------------------------------------------------
// Category ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Value frequencies of a label column, most frequent first.
///
/// Tie-break: labels with equal counts keep the order in which they first
/// appear in the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRanking {
    entries: Vec<CategoryCount>,
}

impl CategoryRanking {
    /// Count non-null labels of `column` in the view. An absent column gives
    /// an empty ranking.
    pub fn from_view(view: &FilteredView<'_>, column: &str) -> Self {
        let Some(values) = view.column_values(column) else {
            return Self::default();
        };

        let mut slot: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<CategoryCount> = Vec::new();
        for v in values {
            let label = match v {
                CellValue::Null => continue,
                CellValue::Text(s) => s.clone(),
                other => other.to_string(),
            };
            match slot.get(&label) {
                Some(&i) => entries[i].count += 1,
                None => {
                    slot.insert(label.clone(), entries.len());
                    entries.push(CategoryCount { label, count: 1 });
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        CategoryRanking { entries }
    }

    pub fn entries(&self) -> &[CategoryCount] {
        &self.entries
    }

    pub fn most_common(&self) -> Option<&CategoryCount> {
        self.entries.first()
    }

    pub fn least_common(&self) -> Option<&CategoryCount> {
        self.entries.last()
    }

    /// The `n` most frequent labels (bar chart data).
    pub fn top(&self, n: usize) -> &[CategoryCount] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Summary of a filtered view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMean {
    pub column: String,
    /// `None` when the column is absent or has no values in the view.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub row_count: usize,
    pub means: Vec<ColumnMean>,
    /// Distinct original category labels; `None` without a category column.
    pub distinct_categories: Option<usize>,
    pub ranking: CategoryRanking,
}

impl Summary {
    /// Summarise `view`, averaging each of `mean_columns`.
    pub fn compute(view: &FilteredView<'_>, mean_columns: &[String]) -> Self {
        let means = mean_columns
            .iter()
            .map(|column| ColumnMean {
                column: column.clone(),
                mean: mean(view, column),
            })
            .collect();

        Summary {
            row_count: view.len(),
            means,
            distinct_categories: distinct_count(view, CATEGORY_COLUMN),
            ranking: CategoryRanking::from_view(view, TRANSLATED_COLUMN),
        }
    }

    pub fn mean_of(&self, column: &str) -> Option<f64> {
        self.means
            .iter()
            .find(|m| m.column == column)
            .and_then(|m| m.mean)
    }
}

/// Arithmetic mean of the non-missing numeric cells of `column`.
pub fn mean(view: &FilteredView<'_>, column: &str) -> Option<f64> {
    let (sum, n) = view
        .column_values(column)?
        .filter_map(CellValue::as_f64)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Number of distinct non-null values of `column`.
pub fn distinct_count(view: &FilteredView<'_>, column: &str) -> Option<usize> {
    let values = view.column_values(column)?;
    Some(values.filter(|v| !v.is_null()).collect::<BTreeSet<_>>().len())
}

// ---------------------------------------------------------------------------
// Dataset overview (unfiltered)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_products: usize,
    /// Distinct original category labels, 0 without a category column.
    pub total_categories: usize,
}

impl DatasetOverview {
    pub fn from_table(table: &ProductTable) -> Self {
        let all = FilteredView::all(table);
        DatasetOverview {
            total_products: table.len(),
            total_categories: distinct_count(&all, CATEGORY_COLUMN).unwrap_or(0),
        }
    }
}
