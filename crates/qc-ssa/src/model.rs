//! Transitions and rate functions.

use qc_core::{CoreError, CoreResult, Params, StateLayout};

/// Integer state change applied when a transition fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    label: String,
    delta: Vec<i64>,
}

impl Transition {
    pub fn new(label: impl Into<String>, delta: impl Into<Vec<i64>>) -> Self {
        Self {
            label: label.into(),
            delta: delta.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn delta(&self) -> &[i64] {
        &self.delta
    }
}

/// A continuous-time Markov jump process.
///
/// `rates` must return one non-negative rate per transition, in the order of
/// [`JumpModel::transitions`]. The transition list is fixed for the lifetime of
/// the model.
pub trait JumpModel: Sync {
    fn layout(&self) -> &StateLayout;

    fn transitions(&self) -> &[Transition];

    /// Parameter names the rate function reads.
    fn required_params(&self) -> &[String] {
        &[]
    }

    fn rates(&self, state: &[i64], params: &Params, t: f64) -> Vec<f64>;
}

type RateFn = Box<dyn Fn(&[i64], &Params, f64) -> Vec<f64> + Send + Sync>;

/// Jump process backed by a plain rate closure.
pub struct JumpProcess {
    layout: StateLayout,
    transitions: Vec<Transition>,
    required: Vec<String>,
    rate_fn: RateFn,
}

impl JumpProcess {
    /// `rate_fn` must return one rate per transition, in transition order.
    ///
    /// Parameters are read by indexing (`p["c"]`), which panics on a name that
    /// was never provided. Declare every name the closure reads with
    /// [`JumpProcess::requiring`]: the engine checks that list against the
    /// supplied `Params` before the first event, so a missing parameter
    /// surfaces as `CoreError::MissingParameter` instead.
    pub fn new<F>(layout: StateLayout, transitions: Vec<Transition>, rate_fn: F) -> CoreResult<Self>
    where
        F: Fn(&[i64], &Params, f64) -> Vec<f64> + Send + Sync + 'static,
    {
        if transitions.is_empty() {
            return Err(CoreError::config("jump process needs at least one transition"));
        }
        for tr in &transitions {
            if tr.delta.len() != layout.len() {
                return Err(CoreError::config(format!(
                    "transition '{}' has {} deltas for {} variables",
                    tr.label,
                    tr.delta.len(),
                    layout.len()
                )));
            }
        }
        Ok(Self {
            layout,
            transitions,
            required: Vec::new(),
            rate_fn: Box::new(rate_fn),
        })
    }

    /// Declare the parameters the rate closure indexes. Must cover every read.
    pub fn requiring<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }
}

impl JumpModel for JumpProcess {
    fn layout(&self) -> &StateLayout {
        &self.layout
    }

    fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    fn required_params(&self) -> &[String] {
        &self.required
    }

    fn rates(&self, state: &[i64], params: &Params, t: f64) -> Vec<f64> {
        (self.rate_fn)(state, params, t)
    }
}

impl std::fmt::Debug for JumpProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JumpProcess")
            .field("layout", &self.layout)
            .field("transitions", &self.transitions)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
