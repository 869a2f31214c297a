//! Model-agnostic domain logic: configuration, panel data, the dual LP
//! engine, and the solver capability it consumes.

mod column;
mod model;
mod panel;
mod result;

pub mod dual;
pub mod error;
pub mod solver;

pub use column::{ColumnSpec, ReturnsToScale};
pub use model::ModelConfig;
pub use panel::{DmuRecord, Panel};
pub use result::ComputeResult;
