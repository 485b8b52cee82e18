//! Named model parameters passed to rate and drift functions.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::error::{CoreError, CoreResult};

/// Parameter mapping `name -> value`.
///
/// Iteration order is the lexicographic order of names, so anything derived
/// from a `Params` (parameter echo columns, hashes) is stable across calls.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, f64>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Overwrite an existing entry in place. Returns false if `name` is absent.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Look up a parameter, failing with `MissingParameter`.
    pub fn value(&self, name: &str) -> CoreResult<f64> {
        self.get(name).ok_or_else(|| CoreError::MissingParameter {
            name: name.to_string(),
        })
    }

    /// Check that every required name is present and finite.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> CoreResult<()> {
        for name in names {
            let name = name.as_ref();
            let v = self.value(name)?;
            if !v.is_finite() {
                return Err(CoreError::config(format!(
                    "parameter '{name}' is not finite ({v})"
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Panics on a missing name. Engines call [`Params::require`] with a model's
/// declared names before the first step, so rate and drift closures may index
/// any name they declared.
impl Index<&str> for Params {
    type Output = f64;

    fn index(&self, name: &str) -> &f64 {
        match self.values.get(name) {
            Some(v) => v,
            None => panic!("parameter '{name}' was not provided"),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<BTreeMap<String, f64>> for Params {
    fn from(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }
}
