//! Validation errors for model configurations and panel data.
//!
//! These errors are returned when a configuration violates a model
//! invariant or when a DMU record cannot be turned into the numeric
//! vectors the LP builder consumes.

use thiserror::Error;

/// Errors that occur when model invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// The MAC numeraire is the first desirable output, so at least one
    /// desirable output column must be configured.
    #[error("no desirable output columns configured")]
    NoOutputColumns,

    /// Column names must be unique across all three categories; a
    /// duplicate would collide in the flat price mapping.
    #[error("duplicate column name across categories: {name}")]
    DuplicateColumn {
        /// The colliding column name.
        name: String,
    },

    /// Weights are lower-bound numerators and must be non-negative.
    #[error("negative weight {weight} for column {name}")]
    NegativeWeight {
        /// The offending column name.
        name: String,
        /// The invalid weight.
        weight: f64,
    },

    /// A DMU record does not contain a configured column.
    #[error("record {row} is missing column {name}")]
    MissingColumn {
        /// Zero-based row index in the submitted data.
        row: usize,
        /// The missing column name.
        name: String,
    },

    /// A DMU record holds a value that cannot be read as a number.
    #[error("record {row} has a non-numeric value for column {name}")]
    NonNumericValue {
        /// Zero-based row index in the submitted data.
        row: usize,
        /// The offending column name.
        name: String,
    },
}
