//! Model configuration: which panel columns play which role.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::{ColumnSpec, ReturnsToScale};
use super::error::ModelError;

fn default_id_col() -> String {
    "id".to_string()
}

fn default_year_col() -> String {
    "year".to_string()
}

/// Full model configuration for one compute batch.
///
/// Field names follow the wire format consumed by the frontend
/// (`inputCols`, `outputCols`, `undesiredCols`, `idCol`, `yearCol`,
/// `isVRS`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Input factor columns, in declaration order.
    pub input_cols: Vec<ColumnSpec>,
    /// Desirable output columns; the first one is the MAC numeraire.
    pub output_cols: Vec<ColumnSpec>,
    /// Undesired output columns.
    pub undesired_cols: Vec<ColumnSpec>,
    /// Identifier column, carried through to results unchanged.
    #[serde(default = "default_id_col")]
    pub id_col: String,
    /// Year column, carried through to results unchanged.
    #[serde(default = "default_year_col")]
    pub year_col: String,
    /// Variable returns to scale when true, constant otherwise.
    #[serde(default, rename = "isVRS")]
    pub is_vrs: bool,
}

impl ModelConfig {
    /// Returns-to-scale assumption as a typed value.
    #[must_use]
    pub const fn returns_to_scale(&self) -> ReturnsToScale {
        if self.is_vrs {
            ReturnsToScale::Vrs
        } else {
            ReturnsToScale::Crs
        }
    }

    /// Number of input columns.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.input_cols.len()
    }

    /// Number of desirable output columns.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.output_cols.len()
    }

    /// Number of undesired output columns.
    #[must_use]
    pub fn num_undesired(&self) -> usize {
        self.undesired_cols.len()
    }

    /// All configured columns in category order: inputs, then desirable
    /// outputs, then undesired outputs. This is also the dual variable
    /// layout used by the LP builder.
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.input_cols
            .iter()
            .chain(self.output_cols.iter())
            .chain(self.undesired_cols.iter())
    }

    /// Check model invariants: at least one desirable output, unique
    /// column names across categories, non-negative weights.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.output_cols.is_empty() {
            return Err(ModelError::NoOutputColumns);
        }

        let mut seen = HashSet::new();
        for col in self.all_columns() {
            if !seen.insert(col.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    name: col.name.clone(),
                });
            }
            if col.weight < 0.0 {
                return Err(ModelError::NegativeWeight {
                    name: col.name.clone(),
                    weight: col.weight,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            input_cols: vec![ColumnSpec::new("L", 1.0, 1.0)],
            output_cols: vec![ColumnSpec::new("Y", 1.0, 1.0)],
            undesired_cols: vec![ColumnSpec::new("C", 1.0, 1.0)],
            id_col: "id".into(),
            year_col: "year".into(),
            is_vrs: false,
        }
    }

    #[test]
    fn validate_accepts_well_formed_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_outputs() {
        let mut cfg = config();
        cfg.output_cols.clear();
        assert!(matches!(cfg.validate(), Err(ModelError::NoOutputColumns)));
    }

    #[test]
    fn validate_rejects_duplicate_names_across_categories() {
        let mut cfg = config();
        cfg.undesired_cols.push(ColumnSpec::new("L", 1.0, 0.5));
        assert!(matches!(
            cfg.validate(),
            Err(ModelError::DuplicateColumn { name }) if name == "L"
        ));
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut cfg = config();
        cfg.input_cols[0].weight = -0.1;
        assert!(matches!(
            cfg.validate(),
            Err(ModelError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{
            "inputCols": [{"name": "L", "direction": 1, "weight": 0.167}],
            "outputCols": [{"name": "Y", "direction": 1, "weight": 0.25}],
            "undesiredCols": [{"name": "C", "direction": 1, "weight": 0.25}],
            "isVRS": true
        }"#;
        let cfg: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.id_col, "id");
        assert_eq!(cfg.year_col, "year");
        assert_eq!(cfg.returns_to_scale(), ReturnsToScale::Vrs);
        assert_eq!(cfg.num_inputs(), 1);
    }
}
