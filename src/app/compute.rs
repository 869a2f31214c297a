//! Batch orchestration: fan the per-DMU solve out over a bounded pool.
//!
//! Each task reads the shared panel arrays and writes nothing shared, so
//! the batch is embarrassingly parallel. Solves run on the blocking pool
//! (LP solving is CPU-bound), gated by a semaphore sized to the hardware,
//! and are collected in completion order while the rest of the batch is
//! still in flight.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::app::progress::Progress;
use crate::domain::dual::solve_dmu;
use crate::domain::solver::Solver;
use crate::domain::{ComputeResult, DmuRecord, ModelConfig, Panel};
use crate::error::Result;

/// Hard cap on concurrent solver tasks, regardless of hardware width.
pub const MAX_WORKERS: usize = 8;

/// Progress updates are coalesced to roughly every 5% of the batch.
const PROGRESS_STRIDES: usize = 20;

/// Worker pool size: `min(available parallelism, cap)`, at least 1.
#[must_use]
pub fn pool_size(cap: usize) -> usize {
    num_cpus::get().min(cap).max(1)
}

/// Solve the dual LP for every submitted record.
///
/// Blocks (asynchronously) until every dispatched task has completed and
/// returns the successful results in completion order. Records that fail
/// extraction or whose LP comes back non-optimal are simply absent; only
/// a malformed configuration aborts the batch.
pub async fn compute_all(
    records: &[DmuRecord],
    config: &ModelConfig,
    solver: Arc<dyn Solver>,
    progress: &Progress,
    max_workers: usize,
) -> Result<Vec<ComputeResult>> {
    config.validate()?;

    let total = records.len();
    progress.begin(total);

    let panel = Arc::new(Panel::from_records(records, config));
    let config = Arc::new(config.clone());
    let workers = pool_size(max_workers);

    info!(
        submitted = total,
        retained = panel.len(),
        dropped = panel.dropped,
        workers,
        scale = config.returns_to_scale().label(),
        "starting batch"
    );

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    // Every unit is spawned up front and queues on the semaphore itself,
    // so collection below overlaps execution and the counter advances
    // while the batch is still running.
    for target in 0..panel.len() {
        let semaphore = semaphore.clone();
        let panel = panel.clone();
        let config = config.clone();
        let solver = solver.clone();

        tasks.spawn(async move {
            // The semaphore is never closed for the lifetime of the batch.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            let solve = tokio::task::spawn_blocking(move || {
                solve_dmu(&panel, target, &config, solver.as_ref())
            });
            match solve.await {
                Ok(result) => result,
                Err(e) => {
                    debug!(error = %e, "solver task failed to join");
                    None
                }
            }
        });
    }

    // Rows dropped at panel construction count as already-completed
    // failed tasks, so the counter still converges to (total, total).
    let stride = (total / PROGRESS_STRIDES).max(1);
    let mut completed = total - panel.len();
    let mut results = Vec::with_capacity(panel.len());

    while let Some(joined) = tasks.join_next().await {
        completed += 1;
        match joined {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, "solver task failed to join");
            }
        }
        if completed % stride == 0 {
            progress.update(completed);
        }
    }

    progress.finish();

    info!(
        submitted = total,
        succeeded = results.len(),
        "batch complete"
    );

    Ok(results)
}
