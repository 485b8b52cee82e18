//! Per-time summaries across replicate trajectories.

use qc_core::{StateLayout, Trajectory};
use serde::Serialize;

use crate::error::{StatsError, StatsResult};

/// Cross-replicate mean and sample standard deviation at each time index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleSummary {
    variables: Vec<String>,
    times: Vec<f64>,
    replicates: usize,
    /// Row-major, one row per time index.
    mean: Vec<f64>,
    /// Absent with a single replicate.
    std: Vec<Option<f64>>,
}

impl EnsembleSummary {
    /// Summarize replicates in slice order.
    pub fn from_trajectories(runs: &[Trajectory<f64>]) -> StatsResult<Self> {
        let first = runs
            .first()
            .ok_or_else(|| StatsError::config("ensemble needs at least one replicate"))?;
        let mut acc = EnsembleAccumulator::new(first);
        for run in runs {
            acc.push(run)?;
        }
        Ok(acc.finish())
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn replicates(&self) -> usize {
        self.replicates
    }

    fn column_index(&self, name: &str) -> StatsResult<usize> {
        self.variables
            .iter()
            .position(|v| v == name)
            .ok_or_else(|| {
                qc_core::CoreError::UnknownVariable {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn mean(&self, name: &str) -> StatsResult<Vec<f64>> {
        let j = self.column_index(name)?;
        let w = self.variables.len();
        Ok(self.mean.iter().skip(j).step_by(w).copied().collect())
    }

    pub fn std(&self, name: &str) -> StatsResult<Vec<Option<f64>>> {
        let j = self.column_index(name)?;
        let w = self.variables.len();
        Ok(self.std.iter().skip(j).step_by(w).copied().collect())
    }
}

/// Running (Welford) accumulator over replicates sharing one time grid.
///
/// Replicates are folded in the order they are pushed, so a fixed push order
/// gives bit-identical summaries.
#[derive(Debug, Clone)]
pub struct EnsembleAccumulator {
    layout: StateLayout,
    times: Vec<f64>,
    count: usize,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl EnsembleAccumulator {
    /// Take layout and time grid from `template`; nothing is accumulated yet.
    pub fn new(template: &Trajectory<f64>) -> Self {
        let cells = template.len() * template.width();
        Self {
            layout: template.layout().clone(),
            times: template.times().to_vec(),
            count: 0,
            mean: vec![0.0; cells],
            m2: vec![0.0; cells],
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn push(&mut self, run: &Trajectory<f64>) -> StatsResult<()> {
        let replicate = self.count;
        if run.layout() != &self.layout {
            return Err(StatsError::ReplicateMismatch {
                replicate,
                what: "state variables differ",
            });
        }
        if run.times() != self.times.as_slice() {
            return Err(StatsError::ReplicateMismatch {
                replicate,
                what: "time grids differ",
            });
        }

        self.count += 1;
        let n = self.count as f64;
        let cells = run.iter().flat_map(|(_, s)| s.iter().copied());
        for ((m, m2), x) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(cells) {
            let delta = x - *m;
            *m += delta / n;
            *m2 += delta * (x - *m);
        }
        Ok(())
    }

    pub fn finish(self) -> EnsembleSummary {
        let std = if self.count < 2 {
            vec![None; self.m2.len()]
        } else {
            let denom = (self.count - 1) as f64;
            self.m2.iter().map(|&m2| Some((m2 / denom).sqrt())).collect()
        };
        EnsembleSummary {
            variables: self.layout.names().to_vec(),
            times: self.times,
            replicates: self.count,
            mean: self.mean,
            std,
        }
    }
}
