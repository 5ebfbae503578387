use std::cmp::Ordering;
use std::fmt;

use crate::error::ColumnError;

/// Original-language category label.
pub const CATEGORY_COLUMN: &str = "product_category_name";
/// Display label derived from [`CATEGORY_COLUMN`] at load time.
pub const TRANSLATED_COLUMN: &str = "product_category_name_translated";
pub const WEIGHT_COLUMN: &str = "product_weight_g";
pub const PHOTOS_COLUMN: &str = "product_photos_qty";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the product table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Distinct counts collect cells into a `BTreeSet`, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Keep the decimal point so whole-number floats reload as floats.
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for numeric predicates and statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text form used for delimited exports: nulls become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema descriptor
// ---------------------------------------------------------------------------

/// Column type, decided once at load time from the column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Narrowest kind that holds every non-null cell.
    /// Integers widen to floats; any other mix, or an all-null column, is text.
    fn infer(values: &[CellValue]) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for v in values {
            let cell_kind = match v {
                CellValue::Null => continue,
                CellValue::Integer(_) => ColumnKind::Integer,
                CellValue::Float(_) => ColumnKind::Float,
                CellValue::Bool(_) => ColumnKind::Bool,
                CellValue::Text(_) => return ColumnKind::Text,
            };
            kind = Some(match (kind, cell_kind) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
                _ => return ColumnKind::Text,
            });
        }
        kind.unwrap_or(ColumnKind::Text)
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    /// One cell per row; every non-null cell matches `kind`.
    pub values: Vec<CellValue>,
}

impl Column {
    /// Classify the cells and coerce them to a single kind.
    pub fn from_values(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnKind::infer(&values);
        let values = values
            .into_iter()
            .map(|v| match (kind, v) {
                (_, CellValue::Null) => CellValue::Null,
                (ColumnKind::Float, CellValue::Integer(i)) => CellValue::Float(i as f64),
                (ColumnKind::Float, CellValue::Float(f)) if f.is_nan() => CellValue::Null,
                (ColumnKind::Text, CellValue::Text(s)) => CellValue::Text(s),
                (ColumnKind::Text, other) => CellValue::Text(other.to_string()),
                (_, other) => other,
            })
            .collect();
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProductTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded dataset, stored column-wise. Immutable once built.
#[derive(Debug, Clone)]
pub struct ProductTable {
    columns: Vec<Column>,
    row_count: usize,
}

impl ProductTable {
    /// Assemble a table; every column must have the same number of rows.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, ColumnError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(ColumnError::Ragged {
                column: bad.name.clone(),
                expected: row_count,
                found: bad.len(),
            });
        }
        Ok(ProductTable { columns, row_count })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Numeric columns in schema order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a column that must exist and be numeric.
    pub fn numeric_column(&self, name: &str) -> Result<&Column, ColumnError> {
        let col = self
            .column(name)
            .ok_or_else(|| ColumnError::Unknown(name.to_string()))?;
        if !col.kind.is_numeric() {
            return Err(ColumnError::NotNumeric {
                column: name.to_string(),
                kind: col.kind,
            });
        }
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_float_and_nan_becomes_null() {
        let col = Column::from_values(
            "w",
            vec![CellValue::Integer(2), CellValue::Float(2.5), CellValue::Float(f64::NAN)],
        );
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(
            col.values,
            vec![CellValue::Float(2.0), CellValue::Float(2.5), CellValue::Null]
        );
    }

    #[test]
    fn mixed_text_column_becomes_text() {
        let col = Column::from_values(
            "c",
            vec![CellValue::Integer(1), CellValue::Text("a".into()), CellValue::Null],
        );
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.values[0], CellValue::Text("1".into()));
        assert!(col.values[2].is_null());
    }

    #[test]
    fn float_fields_keep_a_decimal_point() {
        assert_eq!(CellValue::Float(100.0).to_field(), "100.0");
        assert_eq!(CellValue::Float(1.25).to_field(), "1.25");
        assert_eq!(CellValue::Integer(100).to_field(), "100");
        assert_eq!(CellValue::Null.to_field(), "");
    }

    #[test]
    fn all_null_column_is_not_numeric() {
        let col = Column::from_values("empty", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(col.kind, ColumnKind::Text);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = ProductTable::from_columns(vec![
            Column::from_values("a", vec![CellValue::Integer(1)]),
            Column::from_values("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, ColumnError::Ragged { expected: 1, found: 0, .. }));
    }

    #[test]
    fn numeric_columns_follow_schema_order() {
        let table = ProductTable::from_columns(vec![
            Column::from_values("y", vec![CellValue::Float(1.0)]),
            Column::from_values("label", vec![CellValue::Text("a".into())]),
            Column::from_values("x", vec![CellValue::Integer(3)]),
        ])
        .unwrap();
        assert_eq!(table.numeric_columns(), vec!["y", "x"]);
        assert!(matches!(
            table.numeric_column("label"),
            Err(ColumnError::NotNumeric { .. })
        ));
        assert!(matches!(table.numeric_column("z"), Err(ColumnError::Unknown(_))));
    }
}
