//! Time-stamped state sequences.

use crate::error::{CoreError, CoreResult};
use crate::numeric::Real;
use crate::state::StateLayout;

/// Numeric state value that can be exported as a real.
pub trait StateValue: Copy + Send + Sync + std::fmt::Debug + 'static {
    fn to_real(self) -> Real;
}

impl StateValue for f64 {
    fn to_real(self) -> Real {
        self
    }
}

impl StateValue for i64 {
    fn to_real(self) -> Real {
        self as Real
    }
}

/// Ordered `(time, state)` pairs.
///
/// States are stored row-major in one buffer (`len * width`). A trajectory is
/// read-only once produced; engines build it through [`TrajectoryRecorder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory<T> {
    layout: StateLayout,
    times: Vec<Real>,
    values: Vec<T>,
}

impl<T: StateValue> Trajectory<T> {
    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn variables(&self) -> &[String] {
        self.layout.names()
    }

    pub fn width(&self) -> usize {
        self.layout.len()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Real] {
        &self.times
    }

    pub fn time(&self, index: usize) -> Real {
        self.times[index]
    }

    pub fn state(&self, index: usize) -> &[T] {
        let w = self.width();
        &self.values[index * w..(index + 1) * w]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Real, &[T])> {
        self.times
            .iter()
            .copied()
            .zip(self.values.chunks_exact(self.width()))
    }

    pub fn last_time(&self) -> Option<Real> {
        self.times.last().copied()
    }

    pub fn last_state(&self) -> Option<&[T]> {
        if self.is_empty() {
            None
        } else {
            Some(self.state(self.len() - 1))
        }
    }

    /// All values of one variable, in time order.
    pub fn column(&self, name: &str) -> CoreResult<Vec<T>> {
        let idx = self.layout.index_of(name)?;
        Ok(self
            .values
            .chunks_exact(self.width())
            .map(|row| row[idx])
            .collect())
    }

    /// One variable as reals, ready for the statistics engine.
    pub fn series(&self, name: &str) -> CoreResult<Vec<Real>> {
        Ok(self.column(name)?.into_iter().map(T::to_real).collect())
    }

    pub fn to_real(&self) -> Trajectory<Real> {
        Trajectory {
            layout: self.layout.clone(),
            times: self.times.clone(),
            values: self.values.iter().map(|v| v.to_real()).collect(),
        }
    }

    /// Step-sample onto `grid`: each grid time takes the state of the last
    /// entry at or before it.
    ///
    /// `grid` must be non-decreasing and start no earlier than the first
    /// recorded time.
    pub fn sample_at(&self, grid: &[Real]) -> CoreResult<Trajectory<T>> {
        let Some(&t0) = self.times.first() else {
            return Err(CoreError::config("cannot sample an empty trajectory"));
        };
        if grid.windows(2).any(|w| w[1] < w[0]) {
            return Err(CoreError::config("sampling grid must be non-decreasing"));
        }
        if let Some(&g0) = grid.first()
            && g0 < t0
        {
            return Err(CoreError::config(format!(
                "sampling grid starts at {g0}, before trajectory start {t0}"
            )));
        }

        let mut out = TrajectoryRecorder::with_capacity(self.layout.clone(), grid.len());
        let mut cursor = 0;
        for &g in grid {
            while cursor + 1 < self.len() && self.times[cursor + 1] <= g {
                cursor += 1;
            }
            out.push(g, self.state(cursor));
        }
        Ok(out.finish())
    }
}

/// Append-only builder used by the simulators.
#[derive(Debug)]
pub struct TrajectoryRecorder<T> {
    inner: Trajectory<T>,
}

impl<T: StateValue> TrajectoryRecorder<T> {
    pub fn with_capacity(layout: StateLayout, capacity: usize) -> Self {
        let width = layout.len();
        Self {
            inner: Trajectory {
                layout,
                times: Vec::with_capacity(capacity),
                values: Vec::with_capacity(capacity * width),
            },
        }
    }

    /// Copy `state` in at `time`.
    ///
    /// # Panics
    ///
    /// Panics if `state` does not match the layout width.
    pub fn push(&mut self, time: Real, state: &[T]) {
        assert_eq!(
            state.len(),
            self.inner.width(),
            "state width does not match layout"
        );
        self.inner.times.push(time);
        self.inner.values.extend_from_slice(state);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn finish(self) -> Trajectory<T> {
        self.inner
    }
}
