//! Column classification
//!
//! Finds the temporal column (at most one) and the numeric columns of a
//! dataset. Classification never fails: "nothing found" is an empty result.

use crate::dataset::{Column, Dataset};

/// Result of classifying a dataset's columns
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRoles {
    /// Leftmost column that looks like a date or year, if any
    pub temporal: Option<String>,
    /// All integer and floating point columns, in column order
    pub numeric: Vec<String>,
}

impl ColumnRoles {
    /// First numeric column that is not the temporal column
    ///
    /// A `Year` column of integers is both temporal and numeric; the trend
    /// measure is the next numeric column after excluding it.
    pub fn trend_measure(&self) -> Option<&str> {
        self.numeric
            .iter()
            .map(String::as_str)
            .find(|name| Some(*name) != self.temporal.as_deref())
    }
}

/// Classify the columns of a dataset
///
/// # Examples
///
/// ```
/// use sheetqa::classifier::classify;
/// use sheetqa::dataset::{Column, Dataset, Value};
///
/// let ds = Dataset::new("Sheet1", vec![
///     Column::new("Region", vec![Value::Text("EU".into())]),
///     Column::new("Fiscal Year", vec![Value::Int(2024)]),
///     Column::new("Sales", vec![Value::Float(1.5)]),
/// ]).unwrap();
///
/// let roles = classify(&ds);
/// assert_eq!(roles.temporal.as_deref(), Some("Fiscal Year"));
/// assert_eq!(roles.numeric, vec!["Fiscal Year", "Sales"]);
/// ```
pub fn classify(dataset: &Dataset) -> ColumnRoles {
    let temporal = dataset
        .columns()
        .iter()
        .find(|c| is_temporal(c))
        .map(|c| c.name().to_string());

    let numeric = dataset
        .columns()
        .iter()
        .filter(|c| c.column_type().is_numeric())
        .map(|c| c.name().to_string())
        .collect();

    ColumnRoles { temporal, numeric }
}

fn is_temporal(column: &Column) -> bool {
    if column.column_type().is_temporal() {
        return true;
    }
    let name = column.name().to_lowercase();
    name.contains("year") || name.contains("date")
}
