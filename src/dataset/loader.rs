//! Workbook loading using calamine
//!
//! The first row of a sheet is the header row. Every following row is a
//! data row; column types are inferred once all cells are read.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::dataset::{Column, Dataset, Value};
use crate::error::{Result, SheetQaError};

/// Check a file name against the extension allow-list (case-insensitive)
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use sheetqa::dataset::is_allowed_extension;
///
/// let allowed = vec!["xlsx".to_string(), "xls".to_string()];
/// assert!(is_allowed_extension(Path::new("q1.XLSX"), &allowed));
/// assert!(!is_allowed_extension(Path::new("q1.csv"), &allowed));
/// assert!(!is_allowed_extension(Path::new("q1"), &allowed));
/// ```
pub fn is_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            allowed
                .iter()
                .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// List the sheet names of a workbook in workbook order
///
/// # Errors
///
/// Returns `SheetQaError::Load` if the workbook cannot be opened, or
/// `SheetQaError::EmptySheet` if it has no sheets at all.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)
        .map_err(|e| SheetQaError::Load(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(SheetQaError::EmptySheet(format!(
            "{} contains no sheets",
            path.display()
        ))
        .into());
    }

    tracing::debug!("Workbook {} has sheets: {:?}", path.display(), names);
    Ok(names)
}

/// Read one sheet into a [`Dataset`]
///
/// # Errors
///
/// - `SheetQaError::Load` if the workbook cannot be opened
/// - `SheetQaError::SheetNotFound` if the sheet is missing or unreadable
/// - `SheetQaError::EmptySheet` if the sheet has no header or no data rows
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| SheetQaError::Load(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| SheetQaError::SheetNotFound(format!("{}: {}", sheet, e)))?;

    let dataset = dataset_from_range(sheet, &range)?;
    tracing::info!(
        "Loaded sheet '{}' from {}: {} rows x {} columns",
        sheet,
        path.display(),
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

fn dataset_from_range(sheet: &str, range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) if !range.is_empty() => header,
        _ => return Err(SheetQaError::EmptySheet(sheet.to_string()).into()),
    };

    let names = header_names(header);
    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (index, column) in cells.iter_mut().enumerate() {
            column.push(row.get(index).map(cell_value).unwrap_or(Value::Null));
        }
    }

    if cells.first().map(Vec::is_empty).unwrap_or(true) {
        return Err(SheetQaError::EmptySheet(sheet.to_string()).into());
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::new(sheet, columns)
}

/// Header cells become column names; blanks get `Unnamed: <i>` and
/// repeated names get a numeric suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());

    for (index, cell) in header.iter().enumerate() {
        let raw = cell.to_string().trim().to_string();
        let base = if raw.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            raw
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }

    names
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or(Value::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(format!("#{:?}", e)),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
