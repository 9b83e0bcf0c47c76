//! In-memory table representation shared by all readers

use crate::reader::{LoaderError, LoaderResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    String,
}

impl ColumnType {
    /// Narrowest type that can hold values of both types
    pub fn unify(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::Int64, ColumnType::Float64) | (ColumnType::Float64, ColumnType::Int64) => {
                ColumnType::Float64
            }
            _ => ColumnType::String,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Bool => "bool",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    Bool(bool),
    String(String),
}

impl Value {
    /// Type of a non-null value
    pub fn dtype(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(ColumnType::Int64),
            Value::Float64(_) => Some(ColumnType::Float64),
            Value::Bool(_) => Some(ColumnType::Bool),
            Value::String(_) => Some(ColumnType::String),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to `dtype`, parsing strings. `None` when the value does not fit.
    pub fn cast(&self, dtype: ColumnType) -> Option<Value> {
        match (self, dtype) {
            (Value::Null, _) => Some(Value::Null),
            (other, ColumnType::String) => Some(Value::String(other.to_string())),
            (Value::String(s), ColumnType::Int64) => s.trim().parse().ok().map(Value::Int64),
            (Value::String(s), ColumnType::Float64) => s.trim().parse().ok().map(Value::Float64),
            (Value::String(s), ColumnType::Bool) => parse_bool(s.trim()).map(Value::Bool),
            (Value::Int64(v), ColumnType::Int64) => Some(Value::Int64(*v)),
            (Value::Int64(v), ColumnType::Float64) => Some(Value::Float64(*v as f64)),
            (Value::Float64(v), ColumnType::Float64) => Some(Value::Float64(*v)),
            (Value::Float64(v), ColumnType::Int64) if v.fract() == 0.0 => {
                Some(Value::Int64(*v as i64))
            }
            (Value::Bool(v), ColumnType::Bool) => Some(Value::Bool(*v)),
            _ => None,
        }
    }
}

/// Parse `true`/`false` in any letter case
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Make repeated names unique: `a, a` becomes `a, a.1`
pub(crate) fn unique_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{name}.{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

/// Header cells as column names. Blank cells become `Unnamed: {i}`, then
/// repeats are made unique.
pub(crate) fn header_names(cells: Vec<String>) -> Vec<String> {
    unique_names(
        cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| if cell.is_empty() { format!("Unnamed: {i}") } else { cell })
            .collect(),
    )
}

/// Build a column of `dtype`, casting every value into it
pub(crate) fn cast_column(
    name: &str,
    values: Vec<Value>,
    dtype: ColumnType,
) -> LoaderResult<ColumnData> {
    let mut column = ColumnData::new(dtype);
    for value in values {
        let cast = value.cast(dtype).ok_or_else(|| LoaderError::InvalidValue {
            column: name.to_string(),
            value: value.to_string(),
            expected: dtype.to_string(),
        })?;
        let pushed = column.push(cast);
        debug_assert!(pushed.is_ok(), "cast value does not fit a {dtype} column");
    }
    Ok(column)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A column of nullable cells
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    String(Vec<Option<String>>),
}

impl ColumnData {
    /// Create an empty column of the given type
    pub fn new(dtype: ColumnType) -> Self {
        match dtype {
            ColumnType::Int64 => ColumnData::Int64(Vec::new()),
            ColumnType::Float64 => ColumnData::Float64(Vec::new()),
            ColumnType::Bool => ColumnData::Bool(Vec::new()),
            ColumnType::String => ColumnData::String(Vec::new()),
        }
    }

    /// Build a column from loose values, picking the narrowest common type.
    ///
    /// An all-null column becomes a string column.
    pub fn from_values(values: Vec<Value>) -> Self {
        let dtype = values
            .iter()
            .filter_map(Value::dtype)
            .reduce(ColumnType::unify)
            .unwrap_or(ColumnType::String);

        let mut column = ColumnData::new(dtype);
        for value in values {
            let pushed = column.push(value);
            debug_assert!(pushed.is_ok(), "value does not fit the unified {dtype} column");
        }
        column
    }

    /// Get the column type
    pub fn dtype(&self) -> ColumnType {
        match self {
            ColumnData::Int64(_) => ColumnType::Int64,
            ColumnData::Float64(_) => ColumnType::Float64,
            ColumnData::Bool(_) => ColumnType::Bool,
            ColumnData::String(_) => ColumnType::String,
        }
    }

    /// Get the number of elements
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::String(v) => v.len(),
        }
    }

    /// Check if the column is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of null cells
    pub fn null_count(&self) -> usize {
        (0..self.len())
            .filter(|&i| matches!(self.get(i), Some(Value::Null)))
            .count()
    }

    /// Get a cell, `None` when out of bounds
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            ColumnData::Int64(v) => v.get(index).map(|c| c.map_or(Value::Null, Value::Int64)),
            ColumnData::Float64(v) => v.get(index).map(|c| c.map_or(Value::Null, Value::Float64)),
            ColumnData::Bool(v) => v.get(index).map(|c| c.map_or(Value::Null, Value::Bool)),
            ColumnData::String(v) => v
                .get(index)
                .map(|c| c.clone().map_or(Value::Null, Value::String)),
        }
    }

    /// Append a value, widening integers into float columns and rendering
    /// anything into string columns. Returns the value back if it does not fit.
    pub fn push(&mut self, value: Value) -> Result<(), Value> {
        match (self, value) {
            (ColumnData::Int64(v), Value::Null) => v.push(None),
            (ColumnData::Float64(v), Value::Null) => v.push(None),
            (ColumnData::Bool(v), Value::Null) => v.push(None),
            (ColumnData::String(v), Value::Null) => v.push(None),
            (ColumnData::Int64(v), Value::Int64(x)) => v.push(Some(x)),
            (ColumnData::Float64(v), Value::Float64(x)) => v.push(Some(x)),
            (ColumnData::Float64(v), Value::Int64(x)) => v.push(Some(x as f64)),
            (ColumnData::Bool(v), Value::Bool(x)) => v.push(Some(x)),
            (ColumnData::String(v), Value::String(x)) => v.push(Some(x)),
            (ColumnData::String(v), other) => v.push(Some(other.to_string())),
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn dtype(&self) -> ColumnType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Named columns of equal length, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that all columns have the same length
    pub fn new(columns: Vec<Column>) -> LoaderResult<Self> {
        if let Some(first) = columns.first() {
            if let Some(bad) = columns.iter().find(|c| c.len() != first.len()) {
                return Err(LoaderError::InvalidFormat(format!(
                    "column {} has {} rows, expected {}",
                    bad.name,
                    bad.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a single cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<Value> {
        self.column(column).and_then(|c| c.data.get(row))
    }

    /// Get one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        if index >= self.num_rows() {
            return None;
        }
        self.columns.iter().map(|c| c.data.get(index)).collect()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.num_rows()).filter_map(move |i| self.row(i))
    }

    /// Keep only the named columns, in the order given
    pub fn select<S: AsRef<str>>(self, names: &[S]) -> LoaderResult<Self> {
        let mut columns = self.columns;
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let index = columns
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| LoaderError::ColumnNotFound(name.to_string()))?;
            selected.push(columns.remove(index));
        }
        Ok(Self { columns: selected })
    }

    /// Describe the table's columns
    pub fn schema(&self) -> DataSchema {
        DataSchema::new(
            self.columns
                .iter()
                .map(|c| {
                    ColumnDescriptor::new(&c.name, c.dtype()).with_nullable(c.data.null_count() > 0)
                })
                .collect(),
            self.num_rows(),
        )
    }
}

/// Schema describing the structure of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    /// Column descriptors
    pub columns: Vec<ColumnDescriptor>,

    /// Number of records
    pub num_records: usize,
}

impl DataSchema {
    /// Create a new schema
    pub fn new(columns: Vec<ColumnDescriptor>, num_records: usize) -> Self {
        Self {
            columns,
            num_records,
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Descriptor for a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub dtype: ColumnType,
    /// Whether the column contains nulls
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}
