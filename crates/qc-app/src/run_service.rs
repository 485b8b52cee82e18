//! Run execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use qc_core::Trajectory;
use qc_map::{MapConfig, fold_ensemble, run_map};
use qc_results::{
    Column, RunKind, RunManifest, RunStore, Table, ensemble_table, theory_table, trajectory_table,
};
use qc_scenario::{JumpPlan, MapPlan, Plan, ScenarioDef};
use qc_ssa::{Termination, run_replicates, sample_replicates, simulate};
use qc_stats::{EnsembleAccumulator, EnsembleSummary, kendall_tau};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::scenario_service;

pub const TRAJECTORY_TABLE: &str = "trajectory";
pub const ENSEMBLE_TABLE: &str = "ensemble";

/// Options for running scenarios.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
    /// Replaces the scenario's seed (and so its run ID).
    pub seed: Option<u64>,
    /// Store root; defaults to `.quasicycle/runs` next to the scenario file.
    pub out_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            seed: None,
            out_dir: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub scenario_id: &'a str,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub run_dir: PathBuf,
    pub elapsed_s: f64,
}

/// Tables and run facts produced by executing one scenario, before storage.
#[derive(Debug, Clone)]
pub struct ExecutedRun {
    pub run_kind: RunKind,
    pub tables: Vec<(String, Table)>,
    pub indicator_trends: Vec<(String, Option<f64>)>,
}

/// `out_dir` if given, else the store next to the scenario file.
fn open_store(scenario_path: &Path, out_dir: Option<&Path>) -> AppResult<RunStore> {
    Ok(match out_dir {
        Some(dir) => RunStore::new(dir.to_path_buf())?,
        None => RunStore::for_scenario_file(scenario_path)?,
    })
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();

    let file = scenario_service::load_scenarios(request.scenario_path)?;
    let mut def = scenario_service::get_scenario(&file, request.scenario_id)?.clone();
    if let Some(seed) = request.options.seed {
        def.seed = seed;
    }

    let run_id = qc_results::compute_run_id(&def, &request.options.engine_version);
    let store = open_store(request.scenario_path, request.options.out_dir.as_deref())?;
    let run_dir = store.root().join(&run_id);

    if request.options.use_cache && store.has_run(&run_id) {
        info!(scenario = %def.id, %run_id, "loading cached run");
        let manifest = store.load_manifest(&run_id)?;
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            run_dir,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    info!(scenario = %def.id, seed = def.seed, "running scenario");
    let executed = execute_scenario(&def)?;

    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_id: def.id.clone(),
        scenario_name: def.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        run_kind: executed.run_kind,
        engine_version: request.options.engine_version.clone(),
        seed: def.seed,
        replicates: def.kind.replicates(),
        tables: executed.tables.iter().map(|(n, _)| n.clone()).collect(),
        indicator_trends: executed.indicator_trends.into_iter().collect(),
    };
    store.save_run(&manifest, &executed.tables)?;
    info!(scenario = %def.id, %run_id, "run saved");

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        run_dir,
        elapsed_s: started.elapsed().as_secs_f64(),
    })
}

/// Simulate one scenario and build its export tables. No I/O.
pub fn execute_scenario(def: &ScenarioDef) -> AppResult<ExecutedRun> {
    match qc_scenario::plan(def)? {
        Plan::Jump(plan) => execute_jump(def, &plan),
        Plan::Map(plan) => execute_map(def, &plan),
    }
}

fn execute_jump(def: &ScenarioDef, plan: &JumpPlan) -> AppResult<ExecutedRun> {
    let mut tables = Vec::new();
    let mut trends = Vec::new();

    let (first, events, exhausted_at) = if plan.replicates == 1 {
        let run = simulate(&plan.model, &plan.params, &plan.initial, &plan.config)?;
        let exhausted_at = exhausted(&run.termination, &def.id);
        let events = run.event_count();
        (run.trajectory.to_real(), events, exhausted_at)
    } else {
        let runs = run_replicates(
            &plan.model,
            &plan.params,
            &plan.initial,
            &plan.config,
            plan.replicates,
        )?;
        let extinct = runs
            .iter()
            .filter(|r| matches!(r.termination, Termination::Exhausted { .. }))
            .count();
        if extinct > 0 {
            warn!(scenario = %def.id, extinct, replicates = plan.replicates, "replicates exhausted before horizon");
        }

        let sampled = sample_replicates(&runs, &plan.grid)?;
        let summary = EnsembleSummary::from_trajectories(&sampled)?;
        let indicators = indicator_columns(def, |var| summary.mean(var).map_err(Into::into))?;
        trends.extend(trend_of(&indicators));
        tables.push((
            ENSEMBLE_TABLE.to_string(),
            ensemble_table(&summary, None, &indicators, &plan.params)?,
        ));

        let first = &runs[0];
        let exhausted_at = match first.termination {
            Termination::Exhausted { time } => Some(time),
            Termination::Horizon => None,
        };
        (first.trajectory.to_real(), first.event_count(), exhausted_at)
    };

    // Indicators on the event series belong to the single-run table only.
    let indicators = if plan.replicates == 1 {
        indicator_columns(def, |var| Ok(first.series(var)?))?
    } else {
        Vec::new()
    };
    trends.extend(trend_of(&indicators));
    tables.insert(
        0,
        (
            TRAJECTORY_TABLE.to_string(),
            trajectory_table(&first, &indicators, &plan.params)?,
        ),
    );

    Ok(ExecutedRun {
        run_kind: RunKind::Jump {
            horizon: plan.config.horizon,
            events,
            exhausted_at,
        },
        tables,
        indicator_trends: trends,
    })
}

fn execute_map(def: &ScenarioDef, plan: &MapPlan) -> AppResult<ExecutedRun> {
    let mut tables = Vec::new();
    let mut trends = Vec::new();

    if plan.replicates == 1 {
        let traj = run_map(&plan.model, &plan.params, &plan.initial, &plan.config)?;
        let indicators = indicator_columns(def, |var| Ok(traj.series(var)?))?;
        trends.extend(trend_of(&indicators));
        tables.push((
            TRAJECTORY_TABLE.to_string(),
            trajectory_table(&traj, &indicators, &plan.params)?,
        ));
    } else {
        // Same stream as ensemble replicate 0, exported as a sample path.
        let first_config = MapConfig {
            seed: qc_core::derive_seed(plan.config.seed, 0),
            ..plan.config.clone()
        };
        let first: Trajectory<f64> =
            run_map(&plan.model, &plan.params, &plan.initial, &first_config)?;
        tables.push((
            TRAJECTORY_TABLE.to_string(),
            trajectory_table(&first, &[], &plan.params)?,
        ));

        let summary = map_ensemble_summary(plan)?;
        let theory = plan.theory.map(|v| theory_table(summary.times(), v));
        let indicators = indicator_columns(def, |var| summary.mean(var).map_err(Into::into))?;
        trends.extend(trend_of(&indicators));
        tables.push((
            ENSEMBLE_TABLE.to_string(),
            ensemble_table(&summary, theory.as_ref(), &indicators, &plan.params)?,
        ));
    }

    Ok(ExecutedRun {
        run_kind: RunKind::Map {
            steps: plan.config.steps,
        },
        tables,
        indicator_trends: trends,
    })
}

/// Per-time mean and std over the plan's replicates, folded in replicate order.
pub fn map_ensemble_summary(plan: &MapPlan) -> AppResult<EnsembleSummary> {
    let mut acc: Option<EnsembleAccumulator> = None;
    fold_ensemble(
        &plan.model,
        &plan.params,
        &plan.initial,
        &plan.config,
        plan.replicates,
        |run| {
            acc.get_or_insert_with(|| EnsembleAccumulator::new(run))
                .push(run)
                .map_err(AppError::from)
        },
    )?;
    acc.map(EnsembleAccumulator::finish)
        .ok_or_else(|| AppError::InvalidInput("ensemble produced no replicates".to_string()))
}

fn exhausted(termination: &Termination, scenario: &str) -> Option<f64> {
    match *termination {
        Termination::Exhausted { time } => {
            warn!(scenario, time, "process exhausted before horizon");
            Some(time)
        }
        Termination::Horizon => None,
    }
}

/// Rolling indicator columns over the series `series(variable)` returns.
fn indicator_columns<F>(def: &ScenarioDef, series: F) -> AppResult<Vec<Column>>
where
    F: FnOnce(&str) -> AppResult<Vec<f64>>,
{
    let Some(ind) = &def.indicators else {
        return Ok(Vec::new());
    };
    let values = series(&ind.variable)?;
    if values.len() < ind.width {
        // A single jump run can end with fewer events than the window.
        debug!(
            scenario = %def.id,
            len = values.len(),
            width = ind.width,
            "series shorter than window, indicators absent"
        );
        return Ok(ind
            .indicators()
            .into_iter()
            .map(|indicator| (indicator.column_name(&ind.variable), vec![None; values.len()]))
            .collect());
    }
    ind.indicators()
        .into_iter()
        .map(|indicator| {
            let rolled = indicator.compute(&values, ind.width)?;
            Ok::<_, AppError>((indicator.column_name(&ind.variable), rolled.values))
        })
        .collect()
}

fn trend_of(columns: &[Column]) -> Vec<(String, Option<f64>)> {
    columns
        .iter()
        .map(|(name, values)| (name.clone(), kendall_tau(values)))
        .collect()
}

/// List stored runs, newest first.
pub fn list_runs(
    scenario_path: &Path,
    out_dir: Option<&Path>,
    scenario_id: Option<&str>,
) -> AppResult<Vec<RunManifest>> {
    let store = open_store(scenario_path, out_dir)?;
    Ok(store.list_runs(scenario_id)?)
}

/// Load a stored run's manifest and tables.
pub fn load_run(
    scenario_path: &Path,
    out_dir: Option<&Path>,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<(String, Table)>)> {
    let store = open_store(scenario_path, out_dir)?;
    if !store.has_run(run_id) {
        return Err(AppError::RunNotFound(run_id.to_string()));
    }
    let manifest = store.load_manifest(run_id)?;
    let tables = manifest
        .tables
        .iter()
        .map(|name| Ok((name.clone(), store.load_table(run_id, name)?)))
        .collect::<AppResult<Vec<_>>>()?;
    Ok((manifest, tables))
}
