//! Map runner and trajectory recording.

use std::collections::BTreeMap;

use qc_core::{
    CoreError, Params, SimRng, Trajectory, TrajectoryRecorder, ensure_finite, lerp_over_steps,
    stream,
};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

use crate::clamp::Domain;
use crate::error::{MapError, MapResult};
use crate::model::DriftModel;
use crate::noise::NoiseScale;

/// Linear sweep of one parameter across the run.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamRamp {
    pub name: String,
    pub from: f64,
    pub to: f64,
}

/// Options for map runs.
#[derive(Clone, Debug)]
pub struct MapConfig {
    /// Trajectory length N, including the initial state.
    pub steps: usize,
    /// Seed of the run's random stream.
    pub seed: u64,
    /// Noise scale per declared variable. Every variable needs an entry.
    pub noise: BTreeMap<String, NoiseScale>,
    /// Domain per variable. Variables without an entry are unbounded.
    pub domains: BTreeMap<String, Domain>,
    /// Parameters swept linearly over the run.
    pub ramps: Vec<ParamRamp>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            steps: 500,
            seed: 0,
            noise: BTreeMap::new(),
            domains: BTreeMap::new(),
            ramps: Vec::new(),
        }
    }
}

/// Map simulator bound to a model, parameters and configuration.
///
/// Construction validates everything up front; a bound simulator can then run
/// any number of streams.
pub struct RecursiveMap<'a, M: DriftModel + ?Sized> {
    model: &'a M,
    params: &'a Params,
    steps: usize,
    noise: Vec<NoiseScale>,
    domains: Vec<Domain>,
    ramps: &'a [ParamRamp],
}

impl<'a, M: DriftModel + ?Sized> RecursiveMap<'a, M> {
    pub fn new(model: &'a M, params: &'a Params, config: &'a MapConfig) -> MapResult<Self> {
        let layout = model.layout();
        if config.steps == 0 {
            return Err(CoreError::config("steps must be positive").into());
        }
        params.require(model.required_params())?;

        for name in config.noise.keys().chain(config.domains.keys()) {
            layout.index_of(name)?;
        }
        let noise = layout
            .names()
            .iter()
            .map(|name| {
                let scale = config.noise.get(name).copied().ok_or_else(|| {
                    CoreError::config(format!("missing noise specification for '{name}'"))
                })?;
                if !scale.is_valid() {
                    return Err(CoreError::config(format!(
                        "noise scale for '{name}' must be finite and non-negative"
                    )));
                }
                Ok(scale)
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let domains = layout
            .names()
            .iter()
            .map(|name| config.domains.get(name).copied().unwrap_or_default())
            .collect::<Vec<_>>();
        for (name, d) in layout.names().iter().zip(&domains) {
            if d.lower.is_nan() || d.upper.is_nan() || d.lower > d.upper {
                return Err(CoreError::config(format!("empty domain for '{name}'")).into());
            }
        }

        for ramp in &config.ramps {
            params.value(&ramp.name)?;
            ensure_finite(ramp.from, "ramp start")?;
            ensure_finite(ramp.to, "ramp end")?;
        }

        Ok(Self {
            model,
            params,
            steps: config.steps,
            noise,
            domains,
            ramps: &config.ramps,
        })
    }

    /// Check an initial state against the layout and declared domains.
    pub fn check_initial(&self, initial: &[f64]) -> MapResult<()> {
        let layout = self.model.layout();
        layout.check_width("initial state", initial.len())?;
        for ((name, &v), d) in layout.names().iter().zip(initial).zip(&self.domains) {
            if !d.contains(ensure_finite(v, "initial state")?) {
                return Err(CoreError::config(format!(
                    "initial value {v} for '{name}' is outside its domain"
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Iterate from `initial` for the configured number of steps.
    ///
    /// Per transition: the drift is evaluated for all variables from the prior
    /// state, then one standard-normal draw per variable is taken in
    /// declaration order (even when the scale is zero), then each value is
    /// brought back into its domain before it feeds the next drift.
    pub fn run(&self, initial: &[f64], rng: &mut SimRng) -> MapResult<Trajectory<f64>> {
        self.check_initial(initial)?;

        let layout = self.model.layout();
        let transitions = self.steps - 1;
        let mut params = self.params.clone();
        let mut state = initial.to_vec();
        let mut next = vec![0.0; state.len()];

        let mut recorder = TrajectoryRecorder::with_capacity(layout.clone(), self.steps);
        recorder.push(0.0, &state);

        for step in 0..transitions {
            for ramp in self.ramps {
                params.set(
                    &ramp.name,
                    lerp_over_steps(ramp.from, ramp.to, step, transitions),
                );
            }

            self.model.drift(step, &state, &params, &mut next);

            for i in 0..next.len() {
                let z: f64 = rng.sample(StandardNormal);
                let raw = next[i] + self.noise[i].at(step, transitions) * z;
                next[i] = self.domains[i]
                    .apply(raw)
                    .ok_or_else(|| MapError::DomainViolation {
                        step: step + 1,
                        variable: layout.names()[i].clone(),
                        value: raw,
                    })?;
            }

            std::mem::swap(&mut state, &mut next);
            recorder.push((step + 1) as f64, &state);
        }

        Ok(recorder.finish())
    }
}

/// Run one seeded trajectory of length `config.steps`.
pub fn run_map<M: DriftModel + ?Sized>(
    model: &M,
    params: &Params,
    initial: &[f64],
    config: &MapConfig,
) -> MapResult<Trajectory<f64>> {
    let sim = RecursiveMap::new(model, params, config)?;
    let mut rng = stream(config.seed);
    debug!(seed = config.seed, steps = config.steps, "starting map run");
    sim.run(initial, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clamp::ClampPolicy;
    use crate::model::MapModel;

    fn decay() -> MapModel {
        MapModel::builder()
            .variable("x", |s, p, _| p["a"] * s[0])
            .requiring(["a"])
            .build()
            .unwrap()
    }

    fn quiet(steps: usize) -> MapConfig {
        MapConfig {
            steps,
            noise: [("x".to_string(), NoiseScale::Constant(0.0))].into(),
            ..MapConfig::default()
        }
    }

    #[test]
    fn zero_noise_is_deterministic_iteration() {
        let params = Params::new().with("a", 0.5);
        let traj = run_map(&decay(), &params, &[8.0], &quiet(4)).unwrap();
        assert_eq!(traj.series("x").unwrap(), vec![8.0, 4.0, 2.0, 1.0]);
        assert_eq!(traj.times(), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn single_step_returns_initial_only() {
        let params = Params::new().with("a", 0.5);
        let traj = run_map(&decay(), &params, &[8.0], &quiet(1)).unwrap();
        assert_eq!(traj.len(), 1);
    }

    #[test]
    fn missing_noise_is_configuration_error() {
        let params = Params::new().with("a", 0.5);
        let config = MapConfig {
            steps: 10,
            ..MapConfig::default()
        };
        let err = run_map(&decay(), &params, &[1.0], &config).unwrap_err();
        assert!(format!("{err}").contains("missing noise"));
    }

    #[test]
    fn zero_steps_is_configuration_error() {
        let params = Params::new().with("a", 0.5);
        assert!(matches!(
            run_map(&decay(), &params, &[1.0], &quiet(0)),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn domain_violation_reports_step_and_value() {
        let model = MapModel::builder()
            .variable("x", |s, _, _| s[0] - 1.0)
            .build()
            .unwrap();
        let mut config = quiet(10);
        config
            .domains
            .insert("x".to_string(), Domain::non_negative(ClampPolicy::Reject));
        let err = run_map(&model, &Params::new(), &[2.5], &config).unwrap_err();
        assert_eq!(
            err,
            MapError::DomainViolation {
                step: 3,
                variable: "x".to_string(),
                value: -0.5,
            }
        );
    }

    #[test]
    fn floor_is_applied_before_next_drift() {
        // sqrt of a negative would poison the run with NaN if the floor came late.
        let model = MapModel::builder()
            .variable("x", |s, _, _| s[0].sqrt() - 1.0)
            .build()
            .unwrap();
        let mut config = quiet(6);
        config
            .domains
            .insert("x".to_string(), Domain::non_negative(ClampPolicy::Floor));
        let traj = run_map(&model, &Params::new(), &[0.25], &config).unwrap();
        assert_eq!(traj.series("x").unwrap(), vec![0.25, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn ramp_sweeps_parameter() {
        let model = MapModel::builder()
            .variable("x", |_, p, _| p["a"])
            .requiring(["a"])
            .build()
            .unwrap();
        let params = Params::new().with("a", 0.0);
        let mut config = quiet(5);
        config.ramps.push(ParamRamp {
            name: "a".to_string(),
            from: 1.0,
            to: 4.0,
        });
        let traj = run_map(&model, &params, &[0.0], &config).unwrap();
        assert_eq!(traj.series("x").unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn ramp_on_unknown_parameter_is_rejected() {
        let params = Params::new().with("a", 0.5);
        let mut config = quiet(5);
        config.ramps.push(ParamRamp {
            name: "b".to_string(),
            from: 1.0,
            to: 2.0,
        });
        assert!(run_map(&decay(), &params, &[1.0], &config).is_err());
    }

    #[test]
    fn initial_outside_domain_is_rejected() {
        let params = Params::new().with("a", 0.5);
        let mut config = quiet(5);
        config
            .domains
            .insert("x".to_string(), Domain::non_negative(ClampPolicy::Floor));
        assert!(matches!(
            run_map(&decay(), &params, &[-1.0], &config),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        let params = Params::new().with("a", 0.5);
        assert!(matches!(
            run_map(&decay(), &params, &[f64::NAN], &quiet(5)),
            Err(MapError::Config(CoreError::NonFinite { what: "initial state", .. }))
        ));

        let mut config = quiet(5);
        config.ramps.push(ParamRamp {
            name: "a".to_string(),
            from: 0.5,
            to: f64::INFINITY,
        });
        assert!(matches!(
            run_map(&decay(), &params, &[1.0], &config),
            Err(MapError::Config(CoreError::NonFinite { what: "ramp end", .. }))
        ));
    }
}
