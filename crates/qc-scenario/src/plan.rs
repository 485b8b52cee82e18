//! Turn a validated scenario into engine inputs.

use qc_core::{Params, StateLayout};
use qc_map::{ClampPolicy, Domain, DriftModel, MapConfig, MapModel, NoiseScale, ParamRamp};
use qc_ssa::{JumpModel, JumpProcess, SsaConfig};

use crate::schema::{ClampDef, NoiseDef, ScenarioDef, ScenarioKind, TheoryDef};
use crate::validate::{ValidationError, validate_scenario};
use crate::{ScenarioResult, models};

/// Grid points used for jump replicates when the file gives no spacing.
const DEFAULT_GRID_POINTS: usize = 100;

#[derive(Debug)]
pub struct JumpPlan {
    pub model: JumpProcess,
    pub params: Params,
    pub initial: Vec<i64>,
    pub config: SsaConfig,
    pub replicates: usize,
    /// Shared sampling grid for cross-replicate summaries.
    pub grid: Vec<f64>,
}

#[derive(Debug)]
pub struct MapPlan {
    pub model: MapModel,
    pub params: Params,
    pub initial: Vec<f64>,
    pub config: MapConfig,
    pub replicates: usize,
    pub theory: Option<f64>,
}

#[derive(Debug)]
pub enum Plan {
    Jump(JumpPlan),
    Map(MapPlan),
}

impl Plan {
    pub fn layout(&self) -> &StateLayout {
        match self {
            Plan::Jump(p) => p.model.layout(),
            Plan::Map(p) => p.model.layout(),
        }
    }

    pub fn params(&self) -> &Params {
        match self {
            Plan::Jump(p) => &p.params,
            Plan::Map(p) => &p.params,
        }
    }
}

/// Validate `def` and build its engine inputs.
pub fn plan(def: &ScenarioDef) -> ScenarioResult<Plan> {
    validate_scenario(def)?;
    let params: Params = def.params.clone().into();

    match &def.kind {
        ScenarioKind::Jump {
            model,
            initial,
            horizon,
            replicates,
            grid_step,
        } => {
            let model = models::jump_model(model).ok_or_else(|| unknown(model, def))??;
            let initial = model.layout().arrange(initial)?;
            Ok(Plan::Jump(JumpPlan {
                model,
                params,
                initial,
                config: SsaConfig {
                    horizon: *horizon,
                    seed: def.seed,
                },
                replicates: *replicates,
                grid: jump_grid(*horizon, *grid_step),
            }))
        }
        ScenarioKind::Map {
            model,
            initial,
            steps,
            noise,
            clamp,
            domain,
            replicates,
            ramps,
            theory,
        } => {
            let model = models::map_model(model).ok_or_else(|| unknown(model, def))??;
            let initial = model.layout().arrange(initial)?;
            let policy = match clamp {
                None | Some(ClampDef::Reject) => ClampPolicy::Reject,
                Some(ClampDef::Floor) => ClampPolicy::Floor,
                Some(ClampDef::Reflect) => ClampPolicy::Reflect,
            };

            // Built-in map variables are population sizes: non-negative unless
            // the file says otherwise.
            let domains = model
                .layout()
                .names()
                .iter()
                .map(|var| {
                    let d = domain.get(var);
                    let bounds = Domain {
                        lower: d.and_then(|d| d.lower).unwrap_or(0.0),
                        upper: d.and_then(|d| d.upper).unwrap_or(f64::INFINITY),
                        policy,
                    };
                    (var.clone(), bounds)
                })
                .collect();

            let noise = noise
                .iter()
                .map(|(var, def)| (var.clone(), noise_scale(*def)))
                .collect();

            let theory = theory
                .as_ref()
                .map(|t| theory_value(t, &params, &def.kind))
                .transpose()?;

            Ok(Plan::Map(MapPlan {
                model,
                params,
                initial,
                config: MapConfig {
                    steps: *steps,
                    seed: def.seed,
                    noise,
                    domains,
                    ramps: ramps
                        .iter()
                        .map(|r| ParamRamp {
                            name: r.param.clone(),
                            from: r.from,
                            to: r.to,
                        })
                        .collect(),
                },
                replicates: *replicates,
                theory,
            }))
        }
    }
}

fn unknown(model: &str, def: &ScenarioDef) -> ValidationError {
    ValidationError::UnknownModel {
        model: model.to_string(),
        scenario: def.id.clone(),
    }
}

fn noise_scale(def: NoiseDef) -> NoiseScale {
    match def {
        NoiseDef::Constant(s) => NoiseScale::Constant(s),
        NoiseDef::Linear { from, to } => NoiseScale::Linear { from, to },
    }
}

/// `0, step, 2·step, …` up to and including `horizon` when it lands on the grid.
/// Sampling grid for jump replicates: `grid_step` apart, or
/// `DEFAULT_GRID_POINTS` intervals across the horizon.
pub fn jump_grid(horizon: f64, grid_step: Option<f64>) -> Vec<f64> {
    time_grid(horizon, grid_step.unwrap_or(horizon / DEFAULT_GRID_POINTS as f64))
}

pub fn time_grid(horizon: f64, step: f64) -> Vec<f64> {
    let n = (horizon / step + 1e-9).floor() as usize;
    (0..=n).map(|i| (i as f64 * step).min(horizon)).collect()
}

fn theory_value(theory: &TheoryDef, params: &Params, kind: &ScenarioKind) -> ScenarioResult<f64> {
    match theory {
        TheoryDef::Value { value } => Ok(*value),
        TheoryDef::LogisticNoiseEquilibrium { variable } => {
            let cap = params.value("K")?;
            let sigma = match kind {
                ScenarioKind::Map { noise, .. } => match noise.get(variable) {
                    Some(NoiseDef::Constant(s)) => *s,
                    _ => 0.0,
                },
                ScenarioKind::Jump { .. } => 0.0,
            };
            let disc = 1.0 - 8.0 * sigma * sigma / (cap * cap);
            if disc < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("theory for '{variable}'"),
                    value: sigma.to_string(),
                    reason: "noise too large for a stable logistic equilibrium".to_string(),
                }
                .into());
            }
            Ok(cap * (1.0 + disc.sqrt()) / 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_horizon() {
        assert_eq!(time_grid(1.0, 0.25), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(time_grid(1.0, 0.3).len(), 4);
        let g = time_grid(30.0, 0.3);
        assert_eq!(g.len(), 101);
        assert_eq!(g.last(), Some(&30.0));
    }
}
