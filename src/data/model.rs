use std::collections::HashSet;
use std::fmt;

use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Categorical grouping keys a `BTreeMap` on it, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// A value of a type the explorer does not analyse (dates, nested data).
    Other(String),
    Null,
}

// -- Manual Eq/Ord so we can group by CellValue --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Other(_) => 5,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Other(a), Other(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Text(s) | CellValue::Other(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for numeric analysis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// DataType – the declared semantic type of a column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Text,
    /// Any type outside the four analysed ones, kept by name for display.
    Other(String),
}

impl DataType {
    pub fn is_numerical(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, DataType::Boolean | DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "int64"),
            DataType::Float => write!(f, "float64"),
            DataType::Boolean => write!(f, "bool"),
            DataType::Text => write!(f, "object"),
            DataType::Other(name) => write!(f, "{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table
// ---------------------------------------------------------------------------

/// One named, typed column of a [`Table`].
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }
}

/// An in-memory dataset: ordered columns of equal length.
///
/// The table is read-only once built; every analysis borrows it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);

        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(ExploreError::Parse(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
            if col.values.len() != n_rows {
                return Err(ExploreError::Parse(format!(
                    "column '{}' has {} rows, expected {n_rows}",
                    col.name,
                    col.values.len()
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Table::column`] but reports a missing name as an error.
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| ExploreError::ColumnNotFound(name.to_string()))
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Total number of cells (rows × columns).
    pub fn size(&self) -> usize {
        self.n_rows * self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Cell at `(row, col)` for table display.
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.columns.get(col)?.values.get(row)
    }
}
