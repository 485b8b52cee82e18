//! Domain bounds and what to do when a step leaves them.

/// Action taken when a post-noise value falls outside its domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClampPolicy {
    /// Fail the run with a domain violation.
    #[default]
    Reject,
    /// Truncate to the violated bound (e.g. negative populations become zero).
    Floor,
    /// Mirror about the violated bound, then truncate if still outside.
    Reflect,
}

/// Closed interval a state variable must stay in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub lower: f64,
    pub upper: f64,
    pub policy: ClampPolicy,
}

impl Default for Domain {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Domain {
    pub fn unbounded() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            policy: ClampPolicy::Reject,
        }
    }

    /// `[0, inf)` with the given policy.
    pub fn non_negative(policy: ClampPolicy) -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
            policy,
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }

    /// Bring `v` back into the domain. `None` means the policy rejects it.
    ///
    /// Non-finite values are never recoverable.
    pub fn apply(&self, v: f64) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        if self.contains(v) {
            return Some(v);
        }
        match self.policy {
            ClampPolicy::Reject => None,
            ClampPolicy::Floor => Some(v.clamp(self.lower, self.upper)),
            ClampPolicy::Reflect => {
                let mirrored = if v < self.lower {
                    2.0 * self.lower - v
                } else {
                    2.0 * self.upper - v
                };
                Some(mirrored.clamp(self.lower, self.upper))
            }
        }
    }
}
