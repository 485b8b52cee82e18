//! Gillespie direct method.
//!
//! Each step evaluates every transition rate from the current state, draws an
//! exponential waiting time with the total rate, then picks one transition
//! with probability proportional to its rate. Two uniform-derived draws are
//! consumed per event: the waiting time first, then the categorical choice.

use qc_core::{
    CoreError, Params, SimRng, Trajectory, TrajectoryRecorder, ensure_finite, stream,
};
use rand::Rng;
use rand_distr::Exp1;
use tracing::debug;

use crate::error::{SsaError, SsaResult};
use crate::model::JumpModel;

/// Options for a single jump-process run.
#[derive(Clone, Debug)]
pub struct SsaConfig {
    /// Time horizon T. No event after T is recorded.
    pub horizon: f64,
    /// Seed of the run's random stream.
    pub seed: u64,
}

impl Default for SsaConfig {
    fn default() -> Self {
        Self {
            horizon: 30.0,
            seed: 0,
        }
    }
}

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Termination {
    /// The next waiting time would cross the horizon.
    Horizon,
    /// Total rate reached zero at `time`; no further event can occur.
    Exhausted { time: f64 },
}

/// Output of one jump-process run.
#[derive(Clone, Debug)]
pub struct SsaRun {
    /// `(event time, post-event state)`, starting with the initial state at t=0.
    pub trajectory: Trajectory<i64>,
    /// Total rate evaluated at each recorded state (same length as the trajectory).
    pub total_rates: Vec<f64>,
    pub termination: Termination,
}

impl SsaRun {
    pub fn event_count(&self) -> usize {
        self.trajectory.len().saturating_sub(1)
    }
}

/// Direct-method simulator bound to a model and a parameter set.
pub struct DirectMethod<'a, M: JumpModel + ?Sized> {
    model: &'a M,
    params: &'a Params,
}

impl<'a, M: JumpModel + ?Sized> DirectMethod<'a, M> {
    /// Bind and validate. Fails before any step if a required parameter is
    /// missing.
    pub fn new(model: &'a M, params: &'a Params) -> SsaResult<Self> {
        params.require(model.required_params())?;
        Ok(Self { model, params })
    }

    /// Check an initial state against the model layout.
    pub fn check_initial(&self, initial: &[i64]) -> SsaResult<()> {
        self.model.layout().check_width("initial state", initial.len())?;
        if let Some(n) = initial.iter().find(|&&n| n < 0) {
            return Err(
                CoreError::config(format!("initial counts must be non-negative, got {n}")).into(),
            );
        }
        Ok(())
    }

    /// Run one trajectory to `horizon`, consuming draws from `rng`.
    pub fn simulate(&self, initial: &[i64], horizon: f64, rng: &mut SimRng) -> SsaResult<SsaRun> {
        if ensure_finite(horizon, "horizon")? < 0.0 {
            return Err(CoreError::config(format!(
                "horizon must be non-negative, got {horizon}"
            ))
            .into());
        }
        self.check_initial(initial)?;

        let transitions = self.model.transitions();
        let mut state = initial.to_vec();
        let mut time = 0.0;

        let mut recorder = TrajectoryRecorder::with_capacity(self.model.layout().clone(), 64);
        let mut total_rates = Vec::with_capacity(64);
        recorder.push(time, &state);

        let termination = loop {
            let rates = self.model.rates(&state, self.params, time);
            if rates.len() != transitions.len() {
                return Err(SsaError::RateCountMismatch {
                    expected: transitions.len(),
                    got: rates.len(),
                    time,
                });
            }
            for (index, &rate) in rates.iter().enumerate() {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(SsaError::InvalidRate {
                        index,
                        rate,
                        time,
                        state: state.clone(),
                    });
                }
            }

            let total: f64 = rates.iter().sum();
            total_rates.push(total);
            if total <= 0.0 {
                break Termination::Exhausted { time };
            }

            let wait: f64 = rng.sample::<f64, _>(Exp1) / total;
            let next_time = time + wait;
            if next_time > horizon {
                break Termination::Horizon;
            }
            time = next_time;

            let chosen = select(&rates, total, rng);
            for (slot, d) in state.iter_mut().zip(transitions[chosen].delta()) {
                *slot += d;
            }
            if state.iter().any(|&n| n < 0) {
                return Err(SsaError::NegativeCount {
                    index: chosen,
                    time,
                    state,
                });
            }
            recorder.push(time, &state);
        };

        // One rate evaluation per recorded state, including the last.
        debug_assert_eq!(total_rates.len(), recorder.len());

        let trajectory = recorder.finish();
        debug!(
            events = trajectory.len() - 1,
            ?termination,
            "jump-process run finished"
        );
        Ok(SsaRun {
            trajectory,
            total_rates,
            termination,
        })
    }
}

/// Categorical draw over `rates` normalized by `total`.
///
/// Zero-rate transitions can never be chosen: the cumulative sum only grows on
/// positive rates and the comparison is strict.
fn select(rates: &[f64], total: f64, rng: &mut SimRng) -> usize {
    let u = rng.r#gen::<f64>() * total;
    let mut cumsum = 0.0;
    let mut last_positive = 0;
    for (i, &rate) in rates.iter().enumerate() {
        if rate > 0.0 {
            cumsum += rate;
            last_positive = i;
            if u < cumsum {
                return i;
            }
        }
    }
    // Rounding left u at or past the accumulated sum.
    last_positive
}

/// Run one seeded trajectory.
///
/// The path is a pure function of the model, `params`, `initial`, the horizon
/// and the seed.
pub fn simulate<M: JumpModel + ?Sized>(
    model: &M,
    params: &Params,
    initial: &[i64],
    config: &SsaConfig,
) -> SsaResult<SsaRun> {
    let sim = DirectMethod::new(model, params)?;
    let mut rng = stream(config.seed);
    debug!(seed = config.seed, horizon = config.horizon, "starting jump-process run");
    sim.simulate(initial, config.horizon, &mut rng)
}
