//! nddf - Shadow prices and marginal abatement costs from the NDDF dual.
//!
//! This crate computes, for a panel of decision-making units (DMUs)
//! observed across time, shadow prices of inputs, desirable outputs and
//! undesired outputs, plus a marginal abatement cost (MAC), by solving
//! the dual linear program of a non-radial directional distance function
//! (NDDF) efficiency model under constant or variable returns to scale.
//!
//! # Architecture
//!
//! - **`domain::dual`** - per-DMU dual LP construction and result
//!   extraction, the algorithmic core
//! - **`domain::solver`** - LP solver abstraction
//!   - `HighsSolver` - open-source HiGHS via good_lp
//! - **`app`** - batch orchestration over a bounded worker pool with
//!   advisory progress reporting
//! - **`adapter`** - I/O around the core: spreadsheet ingestion and
//!   export, HTTP transport
//!
//! # Modules
//!
//! - [`config`] - application configuration from TOML files
//! - [`domain`] - model configuration, panel data, LP engine, results
//! - [`error`] - error types for the crate
//! - [`app`] - compute orchestrator and progress counter
//! - [`adapter`] - Excel ingestion/export and the actix-web surface
//! - [`cli`] - command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use nddf::app::{compute_all, Progress};
//! use nddf::domain::solver::HighsSolver;
//! use nddf::domain::{ColumnSpec, ModelConfig};
//!
//! # async fn run() -> nddf::error::Result<()> {
//! let config = ModelConfig {
//!     input_cols: vec![ColumnSpec::new("L", 1.0, 1.0)],
//!     output_cols: vec![ColumnSpec::new("Y", 1.0, 1.0)],
//!     undesired_cols: vec![ColumnSpec::new("C", 1.0, 1.0)],
//!     id_col: "id".into(),
//!     year_col: "year".into(),
//!     is_vrs: false,
//! };
//!
//! let progress = Progress::new();
//! let results = compute_all(&[], &config, Arc::new(HighsSolver::new()), &progress, 8).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
