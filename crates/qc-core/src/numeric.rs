use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Linear interpolation between `from` and `to` at `step` of `steps`.
///
/// The first step returns `from`, the last returns `to`. A single-step run
/// stays at `from`.
pub fn lerp_over_steps(from: Real, to: Real, step: usize, steps: usize) -> Real {
    if steps <= 1 {
        return from;
    }
    let frac = step.min(steps - 1) as Real / (steps - 1) as Real;
    from + (to - from) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp_over_steps(1.0, 3.0, 0, 5), 1.0);
        assert_eq!(lerp_over_steps(1.0, 3.0, 4, 5), 3.0);
        assert_eq!(lerp_over_steps(1.0, 3.0, 2, 5), 2.0);
        assert_eq!(lerp_over_steps(1.0, 3.0, 9, 5), 3.0);
        assert_eq!(lerp_over_steps(1.0, 3.0, 0, 1), 1.0);
    }
}
