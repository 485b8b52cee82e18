use qc_core::{CoreError, Params, Trajectory, derive_seed, stream};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::model::DriftModel;
use crate::sim::{MapConfig, RecursiveMap};

/// Run `replicates` independent trajectories from the same initial state.
///
/// Replicate `i` draws from `derive_seed(config.seed, i)`; results are returned
/// in replicate order.
pub fn run_ensemble<M: DriftModel + ?Sized>(
    model: &M,
    params: &Params,
    initial: &[f64],
    config: &MapConfig,
    replicates: usize,
) -> MapResult<Vec<Trajectory<f64>>> {
    if replicates == 0 {
        return Err(CoreError::config("replicate count must be positive").into());
    }
    let sim = RecursiveMap::new(model, params, config)?;
    sim.check_initial(initial)?;
    debug!(replicates, seed = config.seed, steps = config.steps, "starting map ensemble");

    (0..replicates)
        .into_par_iter()
        .map(|i| {
            let mut rng = stream(derive_seed(config.seed, i as u64));
            sim.run(initial, &mut rng)
        })
        .collect()
}

/// Replicates simulated per parallel batch before they are handed to the fold.
const FOLD_BATCH: usize = 256;

/// Run `replicates` trajectories and pass each to `visit` in replicate order.
///
/// Batches are simulated in parallel and visited sequentially, so a reduction
/// in `visit` sees the same order as iterating `run_ensemble` output, without
/// holding every trajectory at once. The first error from either side stops
/// the run.
pub fn fold_ensemble<M, F, E>(
    model: &M,
    params: &Params,
    initial: &[f64],
    config: &MapConfig,
    replicates: usize,
    mut visit: F,
) -> Result<(), E>
where
    M: DriftModel + ?Sized,
    F: FnMut(&Trajectory<f64>) -> Result<(), E>,
    E: From<MapError>,
{
    if replicates == 0 {
        return Err(MapError::from(CoreError::config("replicate count must be positive")).into());
    }
    let sim = RecursiveMap::new(model, params, config)?;
    sim.check_initial(initial)?;
    debug!(replicates, seed = config.seed, steps = config.steps, "starting map ensemble fold");

    for start in (0..replicates).step_by(FOLD_BATCH) {
        let end = (start + FOLD_BATCH).min(replicates);
        let batch = (start..end)
            .into_par_iter()
            .map(|i| {
                let mut rng = stream(derive_seed(config.seed, i as u64));
                sim.run(initial, &mut rng)
            })
            .collect::<MapResult<Vec<_>>>()?;
        for run in &batch {
            visit(run)?;
        }
    }
    Ok(())
}
