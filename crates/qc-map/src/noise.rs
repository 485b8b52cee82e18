//! Additive Gaussian noise scales.

use qc_core::lerp_over_steps;

/// Standard deviation of the perturbation added at each step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoiseScale {
    Constant(f64),
    /// Linear from `from` at the first transition to `to` at the last.
    Linear { from: f64, to: f64 },
}

impl Default for NoiseScale {
    fn default() -> Self {
        NoiseScale::Constant(0.0)
    }
}

impl NoiseScale {
    /// Scale for transition `step` (state `step` to `step + 1`) of `transitions`.
    pub fn at(&self, step: usize, transitions: usize) -> f64 {
        match *self {
            NoiseScale::Constant(sigma) => sigma,
            NoiseScale::Linear { from, to } => lerp_over_steps(from, to, step, transitions),
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            NoiseScale::Constant(s) => s.is_finite() && s >= 0.0,
            NoiseScale::Linear { from, to } => {
                from.is_finite() && to.is_finite() && from >= 0.0 && to >= 0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scale_hits_endpoints() {
        let s = NoiseScale::Linear { from: 0.1, to: 0.3 };
        assert_eq!(s.at(0, 11), 0.1);
        assert!((s.at(10, 11) - 0.3).abs() < 1e-15);
        assert!((s.at(5, 11) - 0.2).abs() < 1e-15);
    }

    #[test]
    fn negative_scale_is_invalid() {
        assert!(!NoiseScale::Constant(-0.1).is_valid());
        assert!(!NoiseScale::Linear { from: 0.1, to: f64::NAN }.is_valid());
        assert!(NoiseScale::Constant(0.0).is_valid());
    }
}
