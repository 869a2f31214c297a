//! Panel data: the full set of DMU observations as numeric arrays.

use serde_json::Value;
use tracing::debug;

use super::error::ModelError;
use super::model::ModelConfig;

/// One DMU observation as submitted: a mapping from column name to a
/// JSON value. Identifier and year values stay untyped because real
/// panels mix numeric and string identifiers.
pub type DmuRecord = serde_json::Map<String, Value>;

/// Panel arrays aligned to the configuration's column order.
///
/// Each of `x`, `y`, `b` holds one row per retained DMU; the row order
/// matches `ids`/`years`. Rows whose values could not be extracted for
/// every configured column are dropped here, which keeps them out of
/// both the reference set and the results.
#[derive(Debug, Clone)]
pub struct Panel {
    /// Identifier value per retained row.
    pub ids: Vec<Value>,
    /// Year value per retained row.
    pub years: Vec<Value>,
    /// Input values, `N x k_x`.
    pub x: Vec<Vec<f64>>,
    /// Desirable output values, `N x k_y`.
    pub y: Vec<Vec<f64>>,
    /// Undesired output values, `N x k_b`.
    pub b: Vec<Vec<f64>>,
    /// Number of submitted records dropped during extraction.
    pub dropped: usize,
}

impl Panel {
    /// Build panel arrays from raw records.
    ///
    /// Never fails wholesale: malformed records are logged and dropped,
    /// matching the per-DMU failure policy of the batch.
    pub fn from_records(records: &[DmuRecord], config: &ModelConfig) -> Self {
        let mut panel = Self {
            ids: Vec::with_capacity(records.len()),
            years: Vec::with_capacity(records.len()),
            x: Vec::with_capacity(records.len()),
            y: Vec::with_capacity(records.len()),
            b: Vec::with_capacity(records.len()),
            dropped: 0,
        };

        for (row, record) in records.iter().enumerate() {
            match extract_row(record, row, config) {
                Ok((x, y, b)) => {
                    panel
                        .ids
                        .push(record.get(&config.id_col).cloned().unwrap_or(Value::Null));
                    panel
                        .years
                        .push(record.get(&config.year_col).cloned().unwrap_or(Value::Null));
                    panel.x.push(x);
                    panel.y.push(y);
                    panel.b.push(b);
                }
                Err(e) => {
                    debug!(row, error = %e, "dropping malformed record");
                    panel.dropped += 1;
                }
            }
        }

        panel
    }

    /// Number of retained rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether no rows were retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn extract_row(
    record: &DmuRecord,
    row: usize,
    config: &ModelConfig,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), ModelError> {
    let pull = |cols: &[super::column::ColumnSpec]| -> Result<Vec<f64>, ModelError> {
        cols.iter()
            .map(|col| numeric_cell(record, row, &col.name))
            .collect()
    };
    Ok((
        pull(&config.input_cols)?,
        pull(&config.output_cols)?,
        pull(&config.undesired_cols)?,
    ))
}

/// Read one cell as f64. Spreadsheet ingestion can surface numbers as
/// text, so numeric strings are accepted too.
fn numeric_cell(record: &DmuRecord, row: usize, name: &str) -> Result<f64, ModelError> {
    let value = record.get(name).ok_or_else(|| ModelError::MissingColumn {
        row,
        name: name.to_string(),
    })?;

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ModelError::NonNumericValue {
            row,
            name: name.to_string(),
        }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ModelError::NonNumericValue {
                row,
                name: name.to_string(),
            }),
        _ => Err(ModelError::NonNumericValue {
            row,
            name: name.to_string(),
        }),
    }
}
