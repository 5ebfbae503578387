use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ProductTable, CATEGORY_COLUMN, TRANSLATED_COLUMN};
use super::translate::TranslationMap;

/// Tokens read as missing values, in addition to the empty field.
/// Same set as the default `na_values` of pandas' `read_csv`.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a product table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one product per line (the usual export)
/// * `.json`    – `[{ "product_category_name": "...", ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
///
/// Column names are trimmed. When the category column is present a
/// translated copy is appended (see [`attach_translation`]).
pub fn load_file(path: &Path, translations: &TranslationMap) -> Result<ProductTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let columns = attach_translation(columns, translations);
    let table = ProductTable::from_columns(columns)
        .with_context(|| format!("assembling table from {}", path.display()))?;
    Ok(table)
}

/// Append (or replace) the translated category column.
///
/// Each label is looked up in `translations`; unmapped labels are copied
/// unchanged and missing labels stay missing.
pub fn attach_translation(mut columns: Vec<Column>, translations: &TranslationMap) -> Vec<Column> {
    let Some(source) = columns.iter().find(|c| c.name == CATEGORY_COLUMN) else {
        return columns;
    };

    let translated: Vec<CellValue> = source
        .values
        .iter()
        .map(|v| match v {
            CellValue::Null => CellValue::Null,
            CellValue::Text(s) => CellValue::Text(translations.translate(s).to_string()),
            other => {
                let label = other.to_string();
                CellValue::Text(translations.translate(&label).to_string())
            }
        })
        .collect();

    columns.retain(|c| c.name != TRANSLATED_COLUMN);
    columns.push(Column::from_values(TRANSLATED_COLUMN, translated));
    columns
}

// ---------------------------------------------------------------------------
// Memoizing cache
// ---------------------------------------------------------------------------

struct CachedTable {
    modified: Option<SystemTime>,
    table: Arc<ProductTable>,
}

/// Loads tables once per (path, modification time) and hands out shared
/// read-only references.
///
/// A missing source file is reported as `Ok(None)`: callers must stop and
/// show a "no data" state instead of working on a partial table.
pub struct DatasetCache {
    translations: TranslationMap,
    entries: HashMap<PathBuf, CachedTable>,
}

impl DatasetCache {
    pub fn new(translations: TranslationMap) -> Self {
        Self {
            translations,
            entries: HashMap::new(),
        }
    }

    pub fn translations(&self) -> &TranslationMap {
        &self.translations
    }

    /// Return the cached table for `path`, loading it on first use or when
    /// the file's modification time has changed.
    pub fn load(&mut self, path: &Path) -> Result<Option<Arc<ProductTable>>> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::error!("Data file {} not found", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("inspecting {}", path.display()));
            }
        };

        let key = path
            .canonicalize()
            .with_context(|| format!("resolving {}", path.display()))?;
        let modified = meta.modified().ok();

        if let Some(hit) = self.entries.get(&key) {
            if hit.modified == modified {
                log::debug!("Cache hit for {}", key.display());
                return Ok(Some(Arc::clone(&hit.table)));
            }
            log::debug!("{} changed on disk, reloading", key.display());
        }

        let table = Arc::new(load_file(&key, &self.translations)?);
        log::info!(
            "Loaded {} products with columns {:?}",
            table.len(),
            table.column_names()
        );
        self.entries.insert(
            key,
            CachedTable {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(Some(table))
    }

    /// Drop the cached table for `path`. Returns whether an entry existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one product per record.
/// Each column's type is inferred from its cells.
fn load_csv(path: &Path) -> Result<Vec<Column>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(guess_cell_value(value));
        }
    }

    Ok(headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect())
}

fn guess_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    match trimmed {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "product_category_name": "bebes", "product_weight_g": 300, ... },
///   ...
/// ]
/// ```
///
/// Keys missing from a record are read as nulls.
fn load_json(path: &Path) -> Result<Vec<Column>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<CellValue>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            let key = key.trim();
            if !names.iter().any(|n| n == key) {
                names.push(key.to_string());
                // Back-fill earlier rows that lacked this key.
                cells.push(vec![CellValue::Null; i]);
            }
        }

        for (name, column) in names.iter().zip(cells.iter_mut()) {
            let value = obj
                .iter()
                .find(|(k, _)| k.trim() == name)
                .map(|(_, v)| json_to_cell(v))
                .unwrap_or(CellValue::Null);
            column.push(value);
        }
    }

    Ok(names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect())
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested types are rendered as text.
fn load_parquet(path: &Path) -> Result<Vec<Column>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            column.extend((0..batch.num_rows()).map(|row| extract_cell_value(array, row)));
        }
    }

    Ok(names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => arrow::util::display::array_value_to_string(col, row)
            .map(CellValue::Text)
            .unwrap_or_else(|_| CellValue::Text(format!("{other:?}"))),
    }
}
