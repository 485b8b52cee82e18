//! Independent replicate runs.

use qc_core::{CoreError, Params, Trajectory, derive_seed, stream};
use rayon::prelude::*;
use tracing::debug;

use crate::error::SsaResult;
use crate::model::JumpModel;
use crate::ssa::{DirectMethod, SsaConfig, SsaRun};

/// Simulate `replicates` trajectories in parallel.
///
/// Replicate `i` runs on its own stream seeded with
/// `derive_seed(config.seed, i)`, so output order and content do not depend on
/// scheduling. The first failing replicate (by index) aborts the batch.
pub fn run_replicates<M: JumpModel + ?Sized>(
    model: &M,
    params: &Params,
    initial: &[i64],
    config: &SsaConfig,
    replicates: usize,
) -> SsaResult<Vec<SsaRun>> {
    if replicates == 0 {
        return Err(CoreError::config("replicate count must be positive").into());
    }
    let sim = DirectMethod::new(model, params)?;
    sim.check_initial(initial)?;
    debug!(replicates, seed = config.seed, "starting jump-process replicates");

    (0..replicates)
        .into_par_iter()
        .map(|i| {
            let mut rng = stream(derive_seed(config.seed, i as u64));
            sim.simulate(initial, config.horizon, &mut rng)
        })
        .collect()
}

/// Step-sample each run onto a shared time grid for cross-replicate summaries.
pub fn sample_replicates(runs: &[SsaRun], grid: &[f64]) -> SsaResult<Vec<Trajectory<f64>>> {
    runs.par_iter()
        .map(|run| -> SsaResult<Trajectory<f64>> {
            Ok(run.trajectory.sample_at(grid)?.to_real())
        })
        .collect()
}
