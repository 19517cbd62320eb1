//! Grounding context construction
//!
//! Turns a dataset into the plain-text material sent alongside a question:
//! its shape, column names, a preview of the first rows and, when the data
//! has a time axis, a one-sentence trend note.

use prettytable::{format, Cell, Row, Table};

use crate::classifier::classify;
use crate::dataset::{Dataset, Value};
use crate::error::Result;

/// Default number of preview rows
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Change of one numeric column over the temporal column
///
/// Derived on demand from a dataset and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendFinding {
    /// Temporal column the rows were ordered by
    pub temporal_column: String,
    /// Numeric column being tracked
    pub numeric_column: String,
    /// Measure at the earliest point
    pub start: Value,
    /// Measure at the latest point
    pub end: Value,
    /// Full (time, measure) series in ascending time order
    pub series: Vec<(Value, f64)>,
}

impl TrendFinding {
    /// One-sentence description of the trend
    pub fn note(&self) -> String {
        format!(
            "Trend insight: over time, '{}' changed from {} to {}.",
            self.numeric_column, self.start, self.end
        )
    }
}

/// Find the trend of the first non-temporal numeric column
///
/// Rows are ordered by ascending temporal value (stable, empty cells last);
/// rows missing either value are dropped. Needs at least two points.
///
/// # Examples
///
/// ```
/// use sheetqa::context::find_trend;
/// use sheetqa::dataset::{Column, Dataset, Value};
///
/// let ds = Dataset::new("Sheet1", vec![
///     Column::new("Year", vec![Value::Int(2024), Value::Int(2023)]),
///     Column::new("Revenue", vec![Value::Int(150), Value::Int(100)]),
/// ]).unwrap();
///
/// let trend = find_trend(&ds).unwrap();
/// assert_eq!(trend.start, Value::Int(100));
/// assert_eq!(trend.end, Value::Int(150));
/// ```
pub fn find_trend(dataset: &Dataset) -> Option<TrendFinding> {
    if dataset.row_count() < 2 {
        return None;
    }

    let roles = classify(dataset);
    let temporal = dataset.column(roles.temporal.as_deref()?)?;
    let measure = dataset.column(roles.trend_measure()?)?;

    let mut points: Vec<(&Value, &Value)> = temporal
        .values()
        .iter()
        .zip(measure.values())
        .filter(|(t, m)| !t.is_null() && !m.is_null())
        .collect();
    if points.len() < 2 {
        return None;
    }
    points.sort_by(|a, b| a.0.sort_cmp(b.0));

    let start = points.first()?.1.clone();
    let end = points.last()?.1.clone();
    let series = points
        .iter()
        .filter_map(|(t, m)| m.as_f64().map(|y| ((*t).clone(), y)))
        .collect();

    Some(TrendFinding {
        temporal_column: temporal.name().to_string(),
        numeric_column: measure.name().to_string(),
        start,
        end,
        series,
    })
}

/// Text grounding for one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct GroundingContext {
    /// Shape, column list and row preview
    pub summary: String,
    /// Trend over time, when one exists
    pub trend: Option<TrendFinding>,
}

impl GroundingContext {
    /// Trend sentence, if any
    pub fn trend_note(&self) -> Option<String> {
        self.trend.as_ref().map(TrendFinding::note)
    }

    /// Summary followed by the trend note (omitted when there is no trend)
    pub fn render(&self) -> String {
        match self.trend_note() {
            Some(note) => format!("{}\n{}", self.summary, note),
            None => self.summary.clone(),
        }
    }
}

/// Build the grounding context for a dataset
///
/// # Errors
///
/// Propagates failures from rendering the preview table.
pub fn build_context(dataset: &Dataset, preview_rows: usize) -> Result<GroundingContext> {
    let mut summary = format!(
        "The dataset has {} rows and {} columns.\nColumns: {}\n",
        dataset.row_count(),
        dataset.column_count(),
        dataset.column_names().join(", ")
    );

    let shown = preview_rows.min(dataset.row_count());
    summary.push_str(&format!("First {} rows:\n", shown));
    summary.push_str(&preview_table(dataset, shown)?);

    let trend = find_trend(dataset);
    tracing::debug!(
        "Built context for sheet '{}': {} chars, trend={}",
        dataset.name(),
        summary.len(),
        trend.is_some()
    );

    Ok(GroundingContext { summary, trend })
}

fn preview_table(dataset: &Dataset, rows: usize) -> Result<String> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(
        dataset.column_names().into_iter().map(Cell::new).collect(),
    ));
    for index in 0..rows {
        table.add_row(Row::new(
            dataset
                .row(index)
                .into_iter()
                .map(|v| Cell::new(&v.to_string()))
                .collect(),
        ));
    }

    let mut out = Vec::new();
    table.print(&mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    fn revenue_by_year() -> Dataset {
        Dataset::new(
            "Sheet1",
            vec![
                Column::new("Year", vec![Value::Int(2023), Value::Int(2024)]),
                Column::new("Revenue", vec![Value::Int(100), Value::Int(150)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_context_contains_shape_columns_and_trend() {
        let context = build_context(&revenue_by_year(), DEFAULT_PREVIEW_ROWS).unwrap();
        let text = context.render();
        assert!(text.contains("2 rows and 2 columns"));
        assert!(text.contains("Columns: Year, Revenue"));
        assert!(text.contains("2023"));
        assert!(text.ends_with("Trend insight: over time, 'Revenue' changed from 100 to 150."));
    }

    #[test]
    fn test_float_trend_note_shows_stored_values() {
        let ds = Dataset::new(
            "Sheet1",
            vec![
                Column::new("Year", vec![Value::Int(2023), Value::Int(2024)]),
                Column::new("Revenue", vec![Value::Float(100.5), Value::Float(150.0)]),
            ],
        )
        .unwrap();
        let note = build_context(&ds, DEFAULT_PREVIEW_ROWS)
            .unwrap()
            .trend_note()
            .unwrap();
        assert_eq!(
            note,
            "Trend insight: over time, 'Revenue' changed from 100.5 to 150.0."
        );
    }

    #[test]
    fn test_context_is_idempotent() {
        let ds = revenue_by_year();
        let first = build_context(&ds, DEFAULT_PREVIEW_ROWS).unwrap();
        let second = build_context(&ds, DEFAULT_PREVIEW_ROWS).unwrap();
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_preview_is_limited() {
        let years: Vec<Value> = (2000..2010).map(Value::Int).collect();
        let sales: Vec<Value> = (0..10).map(|i| Value::Int(i * 1000 + 7)).collect();
        let ds = Dataset::new(
            "Sheet1",
            vec![Column::new("Year", years), Column::new("Sales", sales)],
        )
        .unwrap();
        let context = build_context(&ds, 5).unwrap();
        assert!(context.summary.contains("First 5 rows:"));
        assert!(context.summary.contains("4007"));
        assert!(!context.summary.contains("5007"));
    }

    #[test]
    fn test_no_trend_without_temporal_column() {
        let ds = Dataset::new(
            "Sheet1",
            vec![Column::new("Revenue", vec![Value::Int(1), Value::Int(2)])],
        )
        .unwrap();
        let context = build_context(&ds, 5).unwrap();
        assert!(context.trend.is_none());
        assert!(!context.render().contains("Trend insight"));
    }

    #[test]
    fn test_no_trend_with_single_row() {
        let ds = Dataset::new(
            "Sheet1",
            vec![
                Column::new("Year", vec![Value::Int(2023)]),
                Column::new("Revenue", vec![Value::Int(100)]),
            ],
        )
        .unwrap();
        assert!(find_trend(&ds).is_none());
    }

    #[test]
    fn test_trend_orders_by_time_not_file_order() {
        let ds = Dataset::new(
            "Sheet1",
            vec![
                Column::new(
                    "Order Date",
                    vec![
                        Value::Text("2024-03".into()),
                        Value::Text("2024-01".into()),
                        Value::Null,
                        Value::Text("2024-02".into()),
                    ],
                ),
                Column::new(
                    "Units",
                    vec![Value::Int(30), Value::Int(10), Value::Int(99), Value::Int(20)],
                ),
            ],
        )
        .unwrap();
        let trend = find_trend(&ds).unwrap();
        assert_eq!(trend.temporal_column, "Order Date");
        assert_eq!(trend.start, Value::Int(10));
        assert_eq!(trend.end, Value::Int(30));
        assert_eq!(trend.series.len(), 3);
        assert_eq!(trend.series[1].1, 20.0);
    }
}
