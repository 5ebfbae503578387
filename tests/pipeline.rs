use std::fs;
use std::path::Path;
use std::sync::Arc;

use product_lens::data::correlation::{correlate, CorrelationReport};
use product_lens::data::export::write_csv_file;
use product_lens::data::model::{CellValue, TRANSLATED_COLUMN};
use product_lens::data::summary::Summary;
use product_lens::{
    filter, DashboardConfig, DashboardState, DatasetCache, FilterParams, FilteredView, Interval,
    TranslationMap,
};

const PRODUCTS: &str = "\
product_id,product_category_name,product_weight_g,product_photos_qty,product_length_cm
p1,A,50,1,10
p2,A,100,2,20
p3,B,150,3,15
p4,A,100,4,40
";

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn alpha_map() -> TranslationMap {
    [("A", "Alpha")].into_iter().collect()
}

#[test]
fn nonexistent_source_halts_the_pipeline() {
    let mut cache = DatasetCache::new(TranslationMap::builtin());
    let loaded = cache.load(Path::new("missing/cleaned_products_data.csv")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn translation_and_ranking_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "products.csv", PRODUCTS);
    let mut cache = DatasetCache::new(alpha_map());
    let table = cache.load(&path).unwrap().unwrap();

    let translated: Vec<_> = table
        .column(TRANSLATED_COLUMN)
        .unwrap()
        .values
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(translated, vec!["Alpha", "Alpha", "B", "Alpha"]);

    let summary = Summary::compute(&FilteredView::all(&table), &[]);
    let most = summary.ranking.most_common().unwrap();
    let least = summary.ranking.least_common().unwrap();
    assert_eq!((most.label.as_str(), most.count), ("Alpha", 3));
    assert_eq!((least.label.as_str(), least.count), ("B", 1));
}

#[test]
fn filter_summarise_correlate_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "products.csv", PRODUCTS);
    let mut cache = DatasetCache::new(alpha_map());
    let table = cache.load(&path).unwrap().unwrap();

    let params = FilterParams {
        categories: ["Alpha".to_string()].into_iter().collect(),
        weight: Some(Interval { lo: 100.0, hi: 100.0 }),
        photos: None,
    };
    let view = filter(&table, &params);
    assert_eq!(view.row_indices(), &[1, 3]);

    let summary = Summary::compute(&view, &["product_photos_qty".to_string()]);
    assert_eq!(summary.mean_of("product_photos_qty"), Some(3.0));

    match correlate(&view) {
        CorrelationReport::Matrix(m) => {
            assert_eq!(
                m.columns,
                vec!["product_weight_g", "product_photos_qty", "product_length_cm"]
            );
            for i in 0..m.size() {
                assert_eq!(m.values[i][i], Some(1.0));
                for j in 0..m.size() {
                    assert_eq!(m.values[i][j], m.values[j][i]);
                }
            }
            // Weight is constant in this view.
            assert_eq!(m.get("product_weight_g", "product_photos_qty"), None);
            assert!((m.get("product_photos_qty", "product_length_cm").unwrap() - 1.0).abs() < 1e-12);
        }
        other => panic!("expected a matrix, got {other:?}"),
    }

    let out = dir.path().join("filtered.csv");
    write_csv_file(&view, &out).unwrap();
    let exported = fs::read_to_string(&out).unwrap();
    assert_eq!(
        exported,
        "product_id,product_category_name,product_weight_g,product_photos_qty,\
         product_length_cm,product_category_name_translated\n\
         p2,A,100,2,20,Alpha\n\
         p4,A,100,4,40,Alpha\n"
    );

    // The source table is untouched and re-exported rows reload identically.
    assert_eq!(table.len(), 4);
    let reloaded = DatasetCache::new(alpha_map()).load(&out).unwrap().unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.column("product_id").unwrap().values,
        vec![CellValue::Text("p2".into()), CellValue::Text("p4".into())]
    );
}

#[test]
fn sessions_share_one_cached_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "products.csv", PRODUCTS);
    let mut cache = DatasetCache::new(alpha_map());

    let table = cache.load(&path).unwrap().unwrap();
    let mut first = DashboardState::new(Arc::clone(&table), DashboardConfig::default());
    let second = DashboardState::new(cache.load(&path).unwrap().unwrap(), DashboardConfig::default());
    assert!(Arc::ptr_eq(first.table(), second.table()));

    first.set_params(FilterParams {
        categories: ["B".to_string()].into_iter().collect(),
        ..FilterParams::default()
    });
    assert_eq!(first.visible_indices(), &[2]);
    assert_eq!(second.visible_indices().len(), 4);
}
