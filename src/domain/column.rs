//! Column declarations for the three factor categories.

use serde::{Deserialize, Serialize};

/// One configured column: an input, a desirable output, or an undesired
/// output, together with its directional flag and weight.
///
/// `direction` selects whether this column participates in the
/// directional projection (1) or is held fixed (0); the per-DMU gradient
/// is `direction * observed value`. `weight` is the NDDF weight assigned
/// to the column and becomes the numerator of the dual variable's lower
/// bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name as it appears in the panel data.
    pub name: String,
    /// Directional flag, conventionally 0 or 1.
    pub direction: f64,
    /// Non-negative NDDF weight.
    pub weight: f64,
}

impl ColumnSpec {
    /// Create a column spec.
    pub fn new(name: impl Into<String>, direction: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            direction,
            weight,
        }
    }
}

/// Returns-to-scale assumption of the envelopment model.
///
/// VRS adds a free intercept-like dual variable (ζ) to every constraint
/// and to the objective; under CRS the variable is absent and reported
/// as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnsToScale {
    /// Constant returns to scale.
    Crs,
    /// Variable returns to scale.
    Vrs,
}

impl ReturnsToScale {
    /// Upper-case label used in file names and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crs => "CRS",
            Self::Vrs => "VRS",
        }
    }

    /// Whether the free ζ variable is present.
    #[must_use]
    pub const fn has_zeta(self) -> bool {
        matches!(self, Self::Vrs)
    }
}
