//! Tabular data model
//!
//! A [`Dataset`] is one parsed sheet: an ordered list of typed columns that
//! all share the same row count. Datasets are immutable once built; loading
//! a sheet again produces a new value.

pub mod loader;

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::{Result, SheetQaError};

pub use loader::{is_allowed_extension, read_sheet, sheet_names};

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell
    Null,
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date or date-time
    DateTime(NaiveDateTime),
    /// Anything else, rendered as text
    Text(String),
}

impl Value {
    /// Returns true for empty cells
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::dataset::Value;
    ///
    /// assert_eq!(Value::Int(3).as_f64(), Some(3.0));
    /// assert_eq!(Value::Text("3".into()).as_f64(), None);
    /// ```
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Total order used when sorting rows by a column
    ///
    /// Nulls sort last. Integers and floats compare numerically with each
    /// other; values of unrelated kinds fall back to a fixed kind order.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.kind_rank().cmp(&b.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::DateTime(_) => 1,
            Value::Bool(_) => 2,
            Value::Text(_) => 3,
            Value::Null => 4,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NaN"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Render a float the way it is stored: whole values keep one decimal
///
/// # Examples
///
/// ```
/// use sheetqa::dataset::format_float;
///
/// assert_eq!(format_float(150.0), "150.0");
/// assert_eq!(format_float(0.1234), "0.1234");
/// ```
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// All non-empty cells are whole numbers
    Integer,
    /// All non-empty cells are numbers, at least one fractional
    Float,
    /// All non-empty cells are booleans
    Boolean,
    /// All non-empty cells are dates or date-times
    DateTime,
    /// Mixed or textual content
    Text,
}

impl ColumnType {
    /// Integer and floating point columns
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Date and date-time columns
    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnType::DateTime)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "int64"),
            Self::Float => write!(f, "float64"),
            Self::Boolean => write!(f, "bool"),
            Self::DateTime => write!(f, "datetime64"),
            Self::Text => write!(f, "object"),
        }
    }
}

/// A named column of values sharing one inferred type
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    values: Vec<Value>,
}

impl Column {
    /// Build a column from raw cells, inferring its type
    ///
    /// Numeric columns are normalized: whole-number columns hold only
    /// `Value::Int`, fractional ones only `Value::Float`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::dataset::{Column, ColumnType, Value};
    ///
    /// let col = Column::new("Revenue", vec![Value::Float(100.0), Value::Int(150)]);
    /// assert_eq!(col.column_type(), ColumnType::Integer);
    /// assert_eq!(col.values()[0], Value::Int(100));
    /// ```
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let column_type = infer_type(&values);
        let values = match column_type {
            ColumnType::Integer => values
                .into_iter()
                .map(|v| match v {
                    Value::Float(f) => Value::Int(f as i64),
                    other => other,
                })
                .collect(),
            ColumnType::Float => values
                .into_iter()
                .map(|v| match v {
                    Value::Int(i) => Value::Float(i as f64),
                    other => other,
                })
                .collect(),
            _ => values,
        };

        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    /// Column header
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inferred column type
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Cell values in row order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of the numeric cells, or `None` for non-numeric columns
    ///
    /// Empty cells are skipped.
    pub fn numeric_sum(&self) -> Option<f64> {
        if !self.column_type.is_numeric() {
            return None;
        }
        Some(self.values.iter().filter_map(Value::as_f64).sum())
    }
}

fn infer_type(values: &[Value]) -> ColumnType {
    let mut present = values.iter().filter(|v| !v.is_null()).peekable();
    if present.peek().is_none() {
        return ColumnType::Text;
    }

    let (mut numeric, mut whole, mut boolean, mut temporal) = (true, true, true, true);
    for value in present {
        match value {
            Value::Int(_) => {
                boolean = false;
                temporal = false;
            }
            Value::Float(f) => {
                boolean = false;
                temporal = false;
                if f.fract() != 0.0 || !f.is_finite() || f.abs() >= i64::MAX as f64 {
                    whole = false;
                }
            }
            Value::Bool(_) => {
                numeric = false;
                temporal = false;
            }
            Value::DateTime(_) => {
                numeric = false;
                boolean = false;
            }
            Value::Text(_) | Value::Null => {
                numeric = false;
                boolean = false;
                temporal = false;
            }
        }
    }

    if numeric && whole {
        ColumnType::Integer
    } else if numeric {
        ColumnType::Float
    } else if boolean {
        ColumnType::Boolean
    } else if temporal {
        ColumnType::DateTime
    } else {
        ColumnType::Text
    }
}

/// One parsed sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, checking that all columns have the same row count
    ///
    /// # Errors
    ///
    /// Returns `SheetQaError::Load` when column lengths differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::dataset::{Column, Dataset, Value};
    ///
    /// let ds = Dataset::new("Sheet1", vec![
    ///     Column::new("Year", vec![Value::Int(2023), Value::Int(2024)]),
    ///     Column::new("Revenue", vec![Value::Int(100), Value::Int(150)]),
    /// ]).unwrap();
    /// assert_eq!(ds.row_count(), 2);
    /// assert_eq!(ds.column_count(), 2);
    /// ```
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
                return Err(SheetQaError::Load(format!(
                    "column '{}' in sheet '{}' has {} rows, expected {}",
                    bad.name(),
                    name,
                    bad.len(),
                    rows
                ))
                .into());
            }
        }
        Ok(Self { name, columns })
    }

    /// Sheet name the dataset was read from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in sheet order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column headers in sheet order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there are no columns or no rows
    pub fn is_empty(&self) -> bool {
        self.column_count() == 0 || self.row_count() == 0
    }

    /// Look up a column by exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column by name, ignoring ASCII case and surrounding whitespace
    pub fn column_ignore_case(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name().trim().eq_ignore_ascii_case(name.trim()))
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns
            .iter()
            .filter_map(|c| c.values().get(index))
            .collect()
    }
}
