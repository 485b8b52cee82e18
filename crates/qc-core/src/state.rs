//! Named state-variable slots.

use std::collections::{BTreeMap, HashSet};

use crate::error::{CoreError, CoreResult};

/// Ordered variable names for a fixed-size state vector.
///
/// The order here is the order of slots in every state vector, of transition
/// deltas, of noise draws and of exported columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateLayout {
    names: Vec<String>,
}

impl StateLayout {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> CoreResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(CoreError::config("state layout needs at least one variable"));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(CoreError::config("state variable names must be non-empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(CoreError::config(format!(
                    "duplicate state variable '{name}'"
                )));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> CoreResult<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| CoreError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Arrange a name-keyed mapping into slot order.
    ///
    /// Every declared variable must be present and no undeclared name may
    /// appear.
    pub fn arrange<T: Copy>(&self, values: &BTreeMap<String, T>) -> CoreResult<Vec<T>> {
        for key in values.keys() {
            self.index_of(key)?;
        }
        self.names
            .iter()
            .map(|name| {
                values.get(name).copied().ok_or_else(|| {
                    CoreError::config(format!("no initial value for variable '{name}'"))
                })
            })
            .collect()
    }

    /// Check a raw vector against the layout width.
    pub fn check_width(&self, what: &'static str, got: usize) -> CoreResult<()> {
        if got != self.len() {
            return Err(CoreError::LengthMismatch {
                what,
                expected: self.len(),
                got,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates_and_empty() {
        assert!(StateLayout::new(Vec::<String>::new()).is_err());
        assert!(StateLayout::new(["x", "x"]).is_err());
        assert!(StateLayout::new(["x", ""]).is_err());
    }

    #[test]
    fn arrange_follows_declaration_order() {
        let layout = StateLayout::new(["prey", "predator"]).unwrap();
        let mut m = BTreeMap::new();
        m.insert("predator".to_string(), 2.0);
        m.insert("prey".to_string(), 5.0);
        assert_eq!(layout.arrange(&m).unwrap(), vec![5.0, 2.0]);
    }

    #[test]
    fn arrange_rejects_unknown_and_missing() {
        let layout = StateLayout::new(["n"]).unwrap();
        let mut m = BTreeMap::new();
        m.insert("m".to_string(), 1_i64);
        assert!(matches!(
            layout.arrange(&m),
            Err(CoreError::UnknownVariable { .. })
        ));
        let empty: BTreeMap<String, i64> = BTreeMap::new();
        assert!(matches!(
            layout.arrange(&empty),
            Err(CoreError::Configuration { .. })
        ));
    }
}
