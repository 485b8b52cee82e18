//! DriftModel trait for pluggable deterministic update rules.

use qc_core::{CoreResult, Params, StateLayout};

/// Deterministic part of a recursive map: `x_{t+1} = drift(t, x_t) + noise`.
///
/// `drift` must read only `state` (the previous step) and write every slot of
/// `next`. All variables advance from the same prior state; implementations
/// must not read values they have already written to `next`.
pub trait DriftModel: Sync {
    fn layout(&self) -> &StateLayout;

    /// Parameter names the drift reads.
    fn required_params(&self) -> &[String] {
        &[]
    }

    fn drift(&self, step: usize, state: &[f64], params: &Params, next: &mut [f64]);
}

type VariableDrift = Box<dyn Fn(&[f64], &Params, usize) -> f64 + Send + Sync>;

/// Map with one drift expression per variable.
///
/// Each expression receives the full prior state, so coupled variables update
/// synchronously regardless of declaration order.
pub struct MapModel {
    layout: StateLayout,
    drifts: Vec<VariableDrift>,
    required: Vec<String>,
}

impl MapModel {
    pub fn builder() -> MapModelBuilder {
        MapModelBuilder::default()
    }
}

impl DriftModel for MapModel {
    fn layout(&self) -> &StateLayout {
        &self.layout
    }

    fn required_params(&self) -> &[String] {
        &self.required
    }

    fn drift(&self, step: usize, state: &[f64], params: &Params, next: &mut [f64]) {
        for (slot, f) in next.iter_mut().zip(&self.drifts) {
            *slot = f(state, params, step);
        }
    }
}

impl std::fmt::Debug for MapModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapModel")
            .field("layout", &self.layout)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct MapModelBuilder {
    names: Vec<String>,
    drifts: Vec<VariableDrift>,
    required: Vec<String>,
}

impl MapModelBuilder {
    /// Declare a variable and its drift expression. Declaration order fixes the
    /// slot order.
    ///
    /// Every parameter `drift` indexes must also be listed with
    /// [`MapModelBuilder::requiring`]. `RecursiveMap::new` checks only the
    /// declared names, and indexing an absent one panics mid-run.
    pub fn variable<F>(mut self, name: impl Into<String>, drift: F) -> Self
    where
        F: Fn(&[f64], &Params, usize) -> f64 + Send + Sync + 'static,
    {
        self.names.push(name.into());
        self.drifts.push(Box::new(drift));
        self
    }

    pub fn requiring<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> CoreResult<MapModel> {
        Ok(MapModel {
            layout: StateLayout::new(self.names)?,
            drifts: self.drifts,
            required: self.required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_reads_prior_state_only() {
        // y depends on x; with synchronous update y sees the old x.
        let model = MapModel::builder()
            .variable("x", |s, _, _| s[0] + 1.0)
            .variable("y", |s, _, _| s[0])
            .build()
            .unwrap();
        let mut next = [0.0; 2];
        model.drift(0, &[3.0, 0.0], &Params::new(), &mut next);
        assert_eq!(next, [4.0, 3.0]);
    }

    #[test]
    fn duplicate_variable_is_rejected() {
        let res = MapModel::builder()
            .variable("x", |s, _, _| s[0])
            .variable("x", |s, _, _| s[0])
            .build();
        assert!(res.is_err());
    }
}
