//! Application layer: batch orchestration and progress reporting.

pub mod compute;
pub mod progress;

pub use compute::{compute_all, MAX_WORKERS};
pub use progress::Progress;
