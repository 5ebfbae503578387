use serde::Serialize;

use super::filter::FilteredView;
use super::model::{CellValue, ProductTable, PHOTOS_COLUMN, TRANSLATED_COLUMN};
use crate::error::ColumnError;

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square, symmetric Pearson matrix over the view's numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where a pair has too few complete rows or no variance.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationReport {
    Matrix(CorrelationMatrix),
    /// Fewer than two numeric columns; lists the ones found.
    NotApplicable { numeric_columns: Vec<String> },
}

impl CorrelationReport {
    pub fn matrix(&self) -> Option<&CorrelationMatrix> {
        match self {
            CorrelationReport::Matrix(m) => Some(m),
            CorrelationReport::NotApplicable { .. } => None,
        }
    }
}

/// Pairwise-complete Pearson correlation of every numeric column pair.
pub fn correlate(view: &FilteredView<'_>) -> CorrelationReport {
    let names: Vec<String> = view
        .table()
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    if names.len() < 2 {
        log::debug!("Correlation skipped: numeric columns {names:?}");
        return CorrelationReport::NotApplicable {
            numeric_columns: names,
        };
    }

    let series: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| {
            view.column_values(name)
                .map(|vals| vals.map(CellValue::as_f64).collect())
                .unwrap_or_default()
        })
        .collect();

    let n = names.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationReport::Matrix(CorrelationMatrix {
        columns: names,
        values,
    })
}

/// Pearson r over rows where both series have a value.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    // Two-pass form: centre first to keep large magnitudes stable.
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let den = (sxx * syy).sqrt();
    if den == 0.0 || !den.is_finite() {
        return None;
    }
    Some((sxy / den).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Pairwise extracts (scatter data)
// ---------------------------------------------------------------------------

/// Which columns feed a scatter extract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSelection {
    pub x: String,
    pub y: String,
    /// Label column used to group (colour) points.
    pub group: Option<String>,
    /// Numeric column used to size points.
    pub size: Option<String>,
}

impl ScatterSelection {
    /// First two numeric columns, sized by photo count when present, ungrouped.
    /// `None` with fewer than two numeric columns.
    pub fn default_for(table: &ProductTable) -> Option<Self> {
        let numeric = table.numeric_columns();
        let (x, y) = match numeric.as_slice() {
            [x, y, ..] => (x.to_string(), y.to_string()),
            _ => return None,
        };
        let size = table
            .numeric_column(PHOTOS_COLUMN)
            .ok()
            .map(|_| PHOTOS_COLUMN.to_string());
        Some(ScatterSelection {
            x,
            y,
            group: None,
            size,
        })
    }

    /// Grouping choices: none, or the translated category column.
    pub fn group_options(table: &ProductTable) -> Vec<Option<String>> {
        let mut options = vec![None];
        if table.has_column(TRANSLATED_COLUMN) {
            options.push(Some(TRANSLATED_COLUMN.to_string()));
        }
        options
    }

    /// Set the grouping column, accepting only the choices of [`Self::group_options`].
    pub fn with_group(
        mut self,
        table: &ProductTable,
        group: Option<String>,
    ) -> Result<Self, ColumnError> {
        if !Self::group_options(table).contains(&group) {
            return Err(ColumnError::NotGroupable(group.unwrap_or_default()));
        }
        self.group = group;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Row index in the source table.
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub group: Option<String>,
    pub size: Option<f64>,
}

/// Extract `(x, y)` points for the view, skipping rows missing either axis.
///
/// `x`, `y` and `size` must be numeric columns; `group` may be any column.
pub fn scatter_points(
    view: &FilteredView<'_>,
    selection: &ScatterSelection,
) -> Result<Vec<ScatterPoint>, ColumnError> {
    let table = view.table();
    let x_col = table.numeric_column(&selection.x)?;
    let y_col = table.numeric_column(&selection.y)?;
    let size_col = selection
        .size
        .as_deref()
        .map(|name| table.numeric_column(name))
        .transpose()?;
    let group_col = selection
        .group
        .as_deref()
        .map(|name| table.column(name).ok_or_else(|| ColumnError::Unknown(name.to_string())))
        .transpose()?;

    let points = view
        .row_indices()
        .iter()
        .filter_map(|&row| {
            let x = x_col.values[row].as_f64()?;
            let y = y_col.values[row].as_f64()?;
            let group = group_col
                .map(|c| &c.values[row])
                .filter(|v| !v.is_null())
                .map(|v| v.to_string());
            let size = size_col.and_then(|c| c.values[row].as_f64());
            Some(ScatterPoint {
                row,
                x,
                y,
                group,
                size,
            })
        })
        .collect();
    Ok(points)
}
