use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use super::filter::FilteredView;
use super::model::{CellValue, ColumnKind};

/// Write the view as CSV: one header row, then every retained row with all
/// columns in table order. Missing values become empty fields.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, out: W) -> Result<()> {
    let table = view.table();
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;

    for &row in view.row_indices() {
        writer
            .write_record(table.columns().iter().map(|c| c.values[row].to_field()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn write_csv_file(view: &FilteredView<'_>, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(view, file)
}

/// Convert the view into a single Arrow record batch with nullable typed
/// columns.
pub fn to_record_batch(view: &FilteredView<'_>) -> Result<RecordBatch> {
    let table = view.table();
    let rows = view.row_indices();

    let mut fields = Vec::with_capacity(table.columns().len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len());

    for col in table.columns() {
        let cells = rows.iter().map(|&i| &col.values[i]);
        let (data_type, array): (DataType, ArrayRef) = match col.kind {
            ColumnKind::Integer => (
                DataType::Int64,
                Arc::new(Int64Array::from_iter(cells.map(|v| match v {
                    CellValue::Integer(i) => Some(*i),
                    _ => None,
                }))),
            ),
            ColumnKind::Float => (
                DataType::Float64,
                Arc::new(Float64Array::from_iter(cells.map(CellValue::as_f64))),
            ),
            ColumnKind::Bool => (
                DataType::Boolean,
                Arc::new(BooleanArray::from_iter(cells.map(|v| match v {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                }))),
            ),
            ColumnKind::Text => (
                DataType::Utf8,
                Arc::new(StringArray::from_iter(cells.map(CellValue::as_str))),
            ),
        };
        fields.push(Field::new(col.name.as_str(), data_type, true));
        arrays.push(array);
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building record batch")?;
    Ok(batch)
}

/// Write the view to a Parquet file.
pub fn write_parquet(view: &FilteredView<'_>, path: &Path) -> Result<()> {
    let batch = to_record_batch(view)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Write the view to an `.xlsx` workbook with a single sheet: a header row,
/// then one row per retained product. Numbers, booleans and text keep their
/// cell types; missing values are left blank.
pub fn write_xlsx(view: &FilteredView<'_>, path: &Path) -> Result<()> {
    let table = view.table();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col_idx, col) in table.columns().iter().enumerate() {
        let c = u16::try_from(col_idx).context("too many columns for a worksheet")?;
        sheet
            .write_string(0, c, col.name.as_str())
            .with_context(|| format!("writing header '{}'", col.name))?;

        for (n, &row) in view.row_indices().iter().enumerate() {
            let r = u32::try_from(n + 1).context("too many rows for a worksheet")?;
            let written = match &col.values[row] {
                CellValue::Null => continue,
                CellValue::Integer(i) => sheet.write_number(r, c, *i as f64),
                CellValue::Float(f) => sheet.write_number(r, c, *f),
                CellValue::Bool(b) => sheet.write_boolean(r, c, *b),
                CellValue::Text(s) => sheet.write_string(r, c, s.as_str()),
            };
            written.with_context(|| format!("writing cell ({r}, {c})"))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}
