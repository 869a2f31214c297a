//! Workbook ingestion: turn uploaded spreadsheet bytes into DMU records.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;

use crate::domain::DmuRecord;
use crate::error::{Error, Result};

/// Rows included in the preview shown before column mapping.
const PREVIEW_ROWS: usize = 10;

/// Parsed contents of one worksheet. The first row is treated as the
/// header row; every following non-empty row becomes a record.
#[derive(Debug, Clone)]
pub struct SheetData {
    /// Worksheet name.
    pub sheet_name: String,
    /// Header row, in sheet order.
    pub columns: Vec<String>,
    /// First rows of data, for UI preview.
    pub preview: Vec<DmuRecord>,
    /// Total number of data rows.
    pub total_rows: usize,
    /// All data rows.
    pub records: Vec<DmuRecord>,
}

/// List the worksheet names of a workbook held in memory.
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::Workbook(e.to_string()))?;
    Ok(workbook.sheet_names().to_owned())
}

/// Read one worksheet into records.
pub fn read_sheet(bytes: &[u8], sheet: &str) -> Result<SheetData> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| Error::Workbook(format!("worksheet {sheet}: {e}")))?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(cell_to_string).collect())
        .unwrap_or_default();

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let mut record = DmuRecord::new();
        for (name, cell) in columns.iter().zip(row.iter()) {
            if !name.is_empty() {
                record.insert(name.clone(), cell_to_value(cell));
            }
        }
        records.push(record);
    }

    Ok(SheetData {
        sheet_name: sheet.to_string(),
        columns,
        preview: records.iter().take(PREVIEW_ROWS).cloned().collect(),
        total_rows: records.len(),
        records,
    })
}

/// Header cell to text.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => format!("{b}"),
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Data cell to a JSON value, keeping numbers numeric.
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::String(s) => Value::String(s.trim().to_string()),
        Data::Float(f) => Value::from(*f),
        Data::Int(i) => Value::from(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::Empty | Data::Error(_) => Value::Null,
        Data::DateTime(dt) => Value::String(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_floats_render_without_decimals() {
        assert_eq!(cell_to_string(&Data::Float(2020.0)), "2020");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn cells_keep_numeric_type() {
        assert_eq!(cell_to_value(&Data::Float(1.5)), serde_json::json!(1.5));
        assert_eq!(cell_to_value(&Data::Int(7)), serde_json::json!(7));
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
    }

    #[test]
    fn invalid_bytes_report_workbook_error() {
        let err = sheet_names(b"not a workbook").unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
    }
}
