//! Public result shape for one solved DMU.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shadow prices and marginal abatement costs for one DMU.
///
/// Created once per successfully solved task and immutable afterwards.
/// The capitalized serialized names (`Efficiency_NDDF`, `Zeta`) are part
/// of the wire and export format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResult {
    /// Identifier value from the source record.
    pub id: Value,
    /// Year value from the source record.
    pub year: Value,
    /// NDDF directional-distance efficiency score (the dual objective).
    #[serde(rename = "Efficiency_NDDF")]
    pub efficiency_nddf: f64,
    /// Value of the free VRS variable, 0 under CRS.
    #[serde(rename = "Zeta")]
    pub zeta: f64,
    /// Shadow price per configured column, across all three categories.
    pub prices: BTreeMap<String, f64>,
    /// Marginal abatement cost per undesired column.
    pub mac: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_wire_field_names() {
        let result = ComputeResult {
            id: json!("R1"),
            year: json!(2020),
            efficiency_nddf: 0.5,
            zeta: 0.0,
            prices: BTreeMap::from([("L".to_string(), 0.1)]),
            mac: BTreeMap::new(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("Efficiency_NDDF").is_some());
        assert!(value.get("Zeta").is_some());
        assert_eq!(value["prices"]["L"], json!(0.1));
    }
}
