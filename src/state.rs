use std::sync::Arc;

use serde::Serialize;

use crate::color::GroupPalette;
use crate::config::DashboardConfig;
use crate::data::correlation::{correlate, scatter_points, CorrelationReport, ScatterPoint, ScatterSelection};
use crate::data::filter::{filter, FilterBounds, FilterParams, FilteredView};
use crate::data::model::ProductTable;
use crate::data::summary::{CategoryCount, DatasetOverview, Summary};
use crate::error::ColumnError;

// ---------------------------------------------------------------------------
// Snapshot handed to the presentation layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterExtract {
    pub selection: ScatterSelection,
    pub points: Vec<ScatterPoint>,
    pub palette: GroupPalette,
}

/// Everything derived from one (table, parameters) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub overview: DatasetOverview,
    pub params: FilterParams,
    pub columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
    pub summary: Summary,
    pub top_categories: Vec<CategoryCount>,
    pub correlation: CorrelationReport,
    /// `None` when no scatter selection applies (fewer than two numeric columns).
    pub scatter: Option<ScatterExtract>,
}

/// Derive the full snapshot for `params`. Pure: the table is only read.
pub fn compute_snapshot(
    table: &ProductTable,
    params: &FilterParams,
    scatter: Option<&ScatterSelection>,
    config: &DashboardConfig,
) -> Result<DashboardSnapshot, ColumnError> {
    snapshot_of_view(&filter(table, params), params, scatter, config)
}

/// Derive the snapshot from an already filtered view.
fn snapshot_of_view(
    view: &FilteredView<'_>,
    params: &FilterParams,
    scatter: Option<&ScatterSelection>,
    config: &DashboardConfig,
) -> Result<DashboardSnapshot, ColumnError> {
    let table = view.table();
    let summary = Summary::compute(&view, &config.summary_columns);
    let top_categories = summary.ranking.top(config.top_categories).to_vec();

    let scatter = scatter
        .map(|selection| scatter_extract(view, selection))
        .transpose()?;

    Ok(DashboardSnapshot {
        overview: DatasetOverview::from_table(table),
        params: params.clone(),
        columns: table.column_names().into_iter().map(str::to_string).collect(),
        preview: view.preview(config.preview_rows),
        summary,
        top_categories,
        correlation: correlate(view),
        scatter,
    })
}

fn scatter_extract(
    view: &FilteredView<'_>,
    selection: &ScatterSelection,
) -> Result<ScatterExtract, ColumnError> {
    let points = scatter_points(view, selection)?;
    let palette = GroupPalette::for_points(&points);
    Ok(ScatterExtract {
        selection: selection.clone(),
        points,
        palette,
    })
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Session state over a shared, read-only table.
pub struct DashboardState {
    table: Arc<ProductTable>,
    config: DashboardConfig,

    /// Selectable categories and full numeric ranges.
    pub bounds: FilterBounds,

    /// Current filter selection.
    params: FilterParams,

    /// Indices of rows passing the current filters (cached).
    visible_indices: Vec<usize>,

    /// Axes for the scatter extract.
    pub scatter: Option<ScatterSelection>,
}

impl DashboardState {
    /// Start with default parameters: full ranges and the first few categories.
    pub fn new(table: Arc<ProductTable>, config: DashboardConfig) -> Self {
        let bounds = FilterBounds::from_table(&table);
        let params = bounds.default_params(config.default_category_count);
        let scatter = ScatterSelection::default_for(&table);
        let mut state = Self {
            table,
            config,
            bounds,
            params,
            visible_indices: Vec::new(),
            scatter,
        };
        state.refilter();
        state
    }

    pub fn table(&self) -> &Arc<ProductTable> {
        &self.table
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Replace the filter parameters wholesale and recompute visible rows.
    pub fn set_params(&mut self, params: FilterParams) {
        self.params = params;
        self.refilter();
    }

    /// Recompute `visible_indices` after a parameter change.
    fn refilter(&mut self) {
        self.visible_indices = filter(&self.table, &self.params).row_indices().to_vec();
        log::debug!(
            "{} of {} products visible",
            self.visible_indices.len(),
            self.table.len()
        );
    }

    /// The current filtered view, rebuilt from the cached indices.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.table, self.visible_indices.clone())
    }

    pub fn snapshot(&self) -> Result<DashboardSnapshot, ColumnError> {
        snapshot_of_view(&self.view(), &self.params, self.scatter.as_ref(), &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Interval;
    use crate::data::model::{
        CellValue, Column, PHOTOS_COLUMN, TRANSLATED_COLUMN, WEIGHT_COLUMN,
    };

    fn table() -> Arc<ProductTable> {
        let labels = ["Toys", "Food", "Toys", "Books", "Art", "Pets", "Food"];
        Arc::new(
            ProductTable::from_columns(vec![
                Column::from_values(
                    TRANSLATED_COLUMN,
                    labels.iter().map(|l| CellValue::Text(l.to_string())).collect(),
                ),
                Column::from_values(
                    WEIGHT_COLUMN,
                    (1..=7).map(|w| CellValue::Integer(w * 100)).collect(),
                ),
                Column::from_values(PHOTOS_COLUMN, (1..=7).map(CellValue::Integer).collect()),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn defaults_select_first_sorted_categories_and_full_ranges() {
        let state = DashboardState::new(table(), DashboardConfig::default());
        let params = state.params();
        let selected: Vec<_> = params.categories.iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["Art", "Books", "Food", "Pets", "Toys"]);
        assert_eq!(params.weight, Some(Interval { lo: 100.0, hi: 700.0 }));
        assert_eq!(state.visible_indices().len(), 7);
    }

    #[test]
    fn set_params_replaces_previous_selection() {
        let mut state = DashboardState::new(table(), DashboardConfig::default());
        state.set_params(FilterParams {
            categories: ["Food".to_string()].into_iter().collect(),
            ..FilterParams::default()
        });
        assert_eq!(state.visible_indices(), &[1, 6]);

        // No merge: the old category selection is gone.
        state.set_params(FilterParams {
            photos: Some(Interval { lo: 3.0, hi: 4.0 }),
            ..FilterParams::default()
        });
        assert_eq!(state.visible_indices(), &[2, 3]);
    }

    #[test]
    fn snapshot_bundles_all_outputs() {
        let mut state = DashboardState::new(table(), DashboardConfig::default());
        state.set_params(FilterParams {
            categories: ["Toys".to_string(), "Food".to_string()].into_iter().collect(),
            ..FilterParams::default()
        });
        let snap = state.snapshot().unwrap();

        assert_eq!(snap.overview.total_products, 7);
        assert_eq!(snap.summary.row_count, 4);
        assert_eq!(snap.top_categories[0].label, "Toys");
        assert_eq!(snap.preview.len(), 4);
        let matrix = snap.correlation.matrix().unwrap();
        assert!((matrix.get(WEIGHT_COLUMN, PHOTOS_COLUMN).unwrap() - 1.0).abs() < 1e-12);

        let scatter = snap.scatter.unwrap();
        assert_eq!(scatter.selection.x, WEIGHT_COLUMN);
        assert_eq!(scatter.points.len(), 4);
        assert!(scatter.points.iter().all(|p| p.size.is_some()));
    }

    #[test]
    fn view_and_snapshot_follow_the_cached_selection() {
        let mut state = DashboardState::new(table(), DashboardConfig::default());
        state.set_params(FilterParams {
            weight: Some(Interval { lo: 200.0, hi: 500.0 }),
            ..FilterParams::default()
        });
        assert_eq!(state.view().row_indices(), state.visible_indices());
        assert_eq!(state.view().row_indices(), &[1, 2, 3, 4]);

        let snap = state.snapshot().unwrap();
        let direct = compute_snapshot(
            state.table(),
            state.params(),
            state.scatter.as_ref(),
            &DashboardConfig::default(),
        )
        .unwrap();
        assert_eq!(snap, direct);
        assert_eq!(snap.summary.row_count, 4);
    }

    #[test]
    fn snapshot_serializes_for_the_presentation_layer() {
        let state = DashboardState::new(table(), DashboardConfig::default());
        let json = serde_json::to_value(state.snapshot().unwrap()).unwrap();
        assert_eq!(json["correlation"]["status"], "matrix");
        assert_eq!(json["summary"]["row_count"], 7);
    }
}
