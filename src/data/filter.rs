use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{
    CellValue, Column, ProductTable, PHOTOS_COLUMN, TRANSLATED_COLUMN, WEIGHT_COLUMN,
};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Closed numeric interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    /// Build an interval, rejecting inverted or non-finite bounds.
    pub fn new(name: &'static str, lo: f64, hi: f64) -> Result<Self, ConfigError> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(ConfigError::NonFiniteBound { name });
        }
        if lo > hi {
            return Err(ConfigError::InvertedRange { name, lo, hi });
        }
        Ok(Interval { lo, hi })
    }

    pub fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }
}

/// One complete set of user selections. A new interaction replaces the
/// whole value; nothing is merged with the previous parameters.
///
/// * `categories` – translated labels to keep. **Empty means no category
///   filter**, the same as selecting every category.
/// * `weight` / `photos` – `None` applies no predicate. When an interval is
///   given, rows with a missing value in that column are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub categories: BTreeSet<String>,
    pub weight: Option<Interval>,
    pub photos: Option<Interval>,
}

// ---------------------------------------------------------------------------
// Filter bounds: what a caller may choose from
// ---------------------------------------------------------------------------

/// Selectable options derived from the whole (unfiltered) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterBounds {
    /// Sorted distinct translated labels.
    pub categories: Vec<String>,
    pub weight: Option<Interval>,
    pub photos: Option<Interval>,
}

impl FilterBounds {
    pub fn from_table(table: &ProductTable) -> Self {
        let categories = table
            .column(TRANSLATED_COLUMN)
            .map(|col| {
                col.values
                    .iter()
                    .filter_map(CellValue::as_str)
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default();

        FilterBounds {
            categories,
            weight: table.column(WEIGHT_COLUMN).and_then(value_range),
            photos: table.column(PHOTOS_COLUMN).and_then(value_range),
        }
    }

    /// Full numeric ranges and the first `category_count` sorted categories.
    pub fn default_params(&self, category_count: usize) -> FilterParams {
        FilterParams {
            categories: self.categories.iter().take(category_count).cloned().collect(),
            weight: self.weight,
            photos: self.photos,
        }
    }
}

/// Min/max of a column's numeric cells, if it has any.
fn value_range(col: &Column) -> Option<Interval> {
    let mut values = col.values.iter().filter_map(CellValue::as_f64);
    let first = values.next()?;
    let (lo, hi) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some(Interval { lo, hi })
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a table that passed the filters, in original order.
/// Borrows the table; the table itself is never modified.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a ProductTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(table: &'a ProductTable) -> Self {
        FilteredView {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    /// Rebuild a view from indices previously produced by [`filter`].
    pub(crate) fn from_indices(table: &'a ProductTable, rows: Vec<usize>) -> Self {
        FilteredView { table, rows }
    }

    pub fn table(&self) -> &'a ProductTable {
        self.table
    }

    /// Indices of retained rows in the source table.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of `column` for the retained rows, or `None` if the column is absent.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &'a CellValue> + '_> {
        let col = self.table.column(column)?;
        Some(self.rows.iter().map(move |&i| &col.values[i]))
    }

    /// Cells of retained row `n` (position in the view), in column order.
    pub fn row(&self, n: usize) -> Option<Vec<&'a CellValue>> {
        let &idx = self.rows.get(n)?;
        Some(self.table.columns().iter().map(|c| &c.values[idx]).collect())
    }

    /// The first `n` rows rendered as display strings (nulls as empty).
    pub fn preview(&self, n: usize) -> Vec<Vec<String>> {
        (0..n.min(self.len()))
            .filter_map(|i| self.row(i))
            .map(|cells| cells.into_iter().map(CellValue::to_field).collect())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Apply `params` to `table` and return the retained rows.
///
/// Predicates are combined with AND. Each one is skipped when its column is
/// absent from the table; the category predicate is also skipped for an
/// empty selection.
pub fn filter<'a>(table: &'a ProductTable, params: &FilterParams) -> FilteredView<'a> {
    let category = if params.categories.is_empty() {
        None
    } else {
        let col = table.column(TRANSLATED_COLUMN);
        if col.is_none() {
            log::debug!("No {TRANSLATED_COLUMN} column, category filter skipped");
        }
        col
    };
    let weight = params.weight.and_then(|iv| interval_column(table, WEIGHT_COLUMN, iv));
    let photos = params.photos.and_then(|iv| interval_column(table, PHOTOS_COLUMN, iv));

    let rows = (0..table.len())
        .filter(|&i| {
            if let Some(col) = category {
                match col.values[i].as_str() {
                    Some(label) if params.categories.contains(label) => {}
                    _ => return false,
                }
            }
            for (col, iv) in [weight, photos].into_iter().flatten() {
                match col.values[i].as_f64() {
                    Some(v) if iv.contains(v) => {}
                    _ => return false,
                }
            }
            true
        })
        .collect();

    FilteredView { table, rows }
}

fn interval_column<'a>(
    table: &'a ProductTable,
    name: &str,
    iv: Interval,
) -> Option<(&'a Column, Interval)> {
    match table.column(name) {
        Some(col) => Some((col, iv)),
        None => {
            log::debug!("No {name} column, range filter skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CATEGORY_COLUMN;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn products() -> ProductTable {
        ProductTable::from_columns(vec![
            Column::from_values(
                TRANSLATED_COLUMN,
                vec![text("Toys"), text("Toys"), text("Food"), CellValue::Null, text("Pet Shop")],
            ),
            Column::from_values(
                WEIGHT_COLUMN,
                vec![
                    CellValue::Integer(50),
                    CellValue::Integer(100),
                    CellValue::Integer(150),
                    CellValue::Integer(100),
                    CellValue::Null,
                ],
            ),
            Column::from_values(
                PHOTOS_COLUMN,
                (1..=5).map(CellValue::Integer).collect(),
            ),
        ])
        .unwrap()
    }

    fn params(categories: &[&str], weight: Option<(f64, f64)>, photos: Option<(f64, f64)>) -> FilterParams {
        FilterParams {
            categories: categories.iter().map(|s| s.to_string()).collect(),
            weight: weight.map(|(lo, hi)| Interval::new("weight", lo, hi).unwrap()),
            photos: photos.map(|(lo, hi)| Interval::new("photos", lo, hi).unwrap()),
        }
    }

    #[test]
    fn degenerate_weight_interval_keeps_exact_match() {
        let table = ProductTable::from_columns(vec![Column::from_values(
            WEIGHT_COLUMN,
            vec![CellValue::Integer(50), CellValue::Integer(100), CellValue::Integer(150)],
        )])
        .unwrap();
        let view = filter(&table, &params(&[], Some((100.0, 100.0)), None));
        assert_eq!(view.row_indices(), &[1]);
    }

    #[test]
    fn predicates_are_conjunctive_and_order_preserving() {
        let table = products();
        let view = filter(&table, &params(&["Toys", "Food"], Some((60.0, 200.0)), None));
        assert_eq!(view.row_indices(), &[1, 2]);
    }

    #[test]
    fn empty_selection_also_keeps_rows_without_a_category() {
        let table = products();
        let bounds = FilterBounds::from_table(&table);
        let none = filter(&table, &params(&[], None, None));
        let every = FilterParams {
            categories: bounds.categories.iter().cloned().collect(),
            ..FilterParams::default()
        };
        let all = filter(&table, &every);
        // The null-category row is dropped only when a selection is active.
        assert_eq!(none.row_indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(all.row_indices(), &[0, 1, 2, 4]);
    }

    #[test]
    fn empty_selection_matches_every_category_when_none_missing() {
        let table = ProductTable::from_columns(vec![Column::from_values(
            TRANSLATED_COLUMN,
            vec![text("A"), text("B"), text("A")],
        )])
        .unwrap();
        let every = params(&["A", "B"], None, None);
        assert_eq!(
            filter(&table, &params(&[], None, None)).row_indices(),
            filter(&table, &every).row_indices()
        );
    }

    #[test]
    fn missing_columns_skip_their_predicates() {
        let table = ProductTable::from_columns(vec![Column::from_values(
            CATEGORY_COLUMN,
            vec![text("x"), text("y")],
        )])
        .unwrap();
        let view = filter(&table, &params(&["nothing"], Some((0.0, 1.0)), Some((0.0, 1.0))));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn missing_values_fail_an_applied_range() {
        let table = products();
        let view = filter(&table, &params(&[], Some((0.0, 1000.0)), None));
        assert_eq!(view.row_indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = products();
        let p = params(&["Toys"], Some((0.0, 120.0)), Some((1.0, 4.0)));
        let a = filter(&table, &p);
        let b = filter(&table, &p);
        assert_eq!(a.row_indices(), b.row_indices());
    }

    #[test]
    fn narrowing_ranges_never_grows_the_view() {
        let table = products();
        let mut last = usize::MAX;
        for (lo, hi) in [(0.0, 500.0), (40.0, 160.0), (60.0, 140.0), (100.0, 100.0), (101.0, 101.0)] {
            let n = filter(&table, &params(&[], Some((lo, hi)), None)).len();
            assert!(n <= last);
            last = n;
        }
        let mut last = usize::MAX;
        for (lo, hi) in [(1.0, 5.0), (2.0, 5.0), (2.0, 3.0), (3.0, 3.0)] {
            let n = filter(&table, &params(&[], None, Some((lo, hi)))).len();
            assert!(n <= last);
            last = n;
        }
    }

    #[test]
    fn bounds_cover_the_whole_table() {
        let bounds = FilterBounds::from_table(&products());
        assert_eq!(bounds.categories, vec!["Food", "Pet Shop", "Toys"]);
        assert_eq!(bounds.weight, Some(Interval { lo: 50.0, hi: 150.0 }));
        assert_eq!(bounds.photos, Some(Interval { lo: 1.0, hi: 5.0 }));

        let defaults = bounds.default_params(2);
        assert_eq!(defaults.categories.len(), 2);
        assert!(defaults.categories.contains("Food"));
        assert!(defaults.categories.contains("Pet Shop"));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        assert!(matches!(
            Interval::new("weight", 5.0, 1.0),
            Err(ConfigError::InvertedRange { .. })
        ));
        assert!(Interval::new("weight", f64::NAN, 1.0).is_err());
    }

    #[test]
    fn preview_renders_first_rows() {
        let table = products();
        let view = filter(&table, &params(&["Pet Shop"], None, None));
        assert_eq!(view.preview(10), vec![vec!["Pet Shop".to_string(), String::new(), "5".to_string()]]);
    }
}
