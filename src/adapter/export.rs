//! Result export: write a batch to an xlsx workbook.

use std::io::Cursor;

use serde_json::Value;
use umya_spreadsheet::Worksheet;

use crate::domain::{ComputeResult, ModelConfig};
use crate::error::{Error, Result};

/// Suggested attachment name, e.g. `NDDF_ShadowPrices_CRS.xlsx`.
#[must_use]
pub fn export_filename(config: &ModelConfig) -> String {
    format!(
        "NDDF_ShadowPrices_{}.xlsx",
        config.returns_to_scale().label()
    )
}

/// Build a `Results` worksheet: id, year, efficiency, ζ, one
/// `Price_<col>` column per configured column and one `MAC_<col>` per
/// undesired column, rows in result order.
pub fn results_workbook(config: &ModelConfig, results: &[ComputeResult]) -> Result<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| Error::Export("workbook has no worksheet".into()))?;
    sheet.set_name("Results");

    let mut headers = vec![
        config.id_col.clone(),
        config.year_col.clone(),
        "Efficiency_NDDF".to_string(),
        "Zeta".to_string(),
    ];
    headers.extend(config.all_columns().map(|c| format!("Price_{}", c.name)));
    headers.extend(config.undesired_cols.iter().map(|c| format!("MAC_{}", c.name)));

    for (col, header) in headers.iter().enumerate() {
        sheet
            .get_cell_mut(((col + 1) as u32, 1))
            .set_value(header.clone());
    }

    for (row, result) in results.iter().enumerate() {
        let row = (row + 2) as u32;
        let mut col = 1u32;

        set_json_cell(sheet, col, row, &result.id);
        col += 1;
        set_json_cell(sheet, col, row, &result.year);
        col += 1;
        sheet
            .get_cell_mut((col, row))
            .set_value_number(result.efficiency_nddf);
        col += 1;
        sheet.get_cell_mut((col, row)).set_value_number(result.zeta);
        col += 1;

        for spec in config.all_columns() {
            let price = result.prices.get(&spec.name).copied().unwrap_or(0.0);
            sheet.get_cell_mut((col, row)).set_value_number(price);
            col += 1;
        }
        for spec in &config.undesired_cols {
            let mac = result.mac.get(&spec.name).copied().unwrap_or(0.0);
            sheet.get_cell_mut((col, row)).set_value_number(mac);
            col += 1;
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
        .map_err(|e| Error::Export(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Identifier and year values keep their submitted type: numbers stay
/// numbers, everything else becomes text.
fn set_json_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &Value) {
    let cell = sheet.get_cell_mut((col, row));
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                cell.set_value_number(f);
            }
        }
        Value::String(s) => {
            cell.set_value(s.clone());
        }
        Value::Null => {}
        other => {
            cell.set_value(other.to_string());
        }
    }
}
