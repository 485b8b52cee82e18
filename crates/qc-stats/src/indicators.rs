//! Window statistics and the selectable early-warning indicator set.
//!
//! Variance-type statistics default to the sample estimator (`ddof = 1`).
//! Both variance and coefficient of variation are offered: variance tracks
//! absolute fluctuation size, CV normalizes it by the level, and which of the
//! two is the better warning signal depends on the model.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::window::{RollingSeries, WindowStatistic, rolling};

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sum of squared deviations about the mean (two-pass).
fn sum_sq_dev(xs: &[f64]) -> (f64, f64) {
    let m = mean(xs);
    let ss = xs.iter().map(|&x| (x - m) * (x - m)).sum();
    (m, ss)
}

fn is_constant(xs: &[f64]) -> bool {
    xs.iter().all(|&x| x == xs[0])
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl WindowStatistic for Mean {
    fn name(&self) -> String {
        "mean".into()
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64> {
        Some(mean(span))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Variance {
    pub ddof: usize,
}

impl Default for Variance {
    fn default() -> Self {
        Self { ddof: 1 }
    }
}

impl WindowStatistic for Variance {
    fn name(&self) -> String {
        "variance".into()
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64> {
        if span.len() <= self.ddof {
            return None;
        }
        if is_constant(span) {
            return Some(0.0);
        }
        let (_, ss) = sum_sq_dev(span);
        Some(ss / (span.len() - self.ddof) as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StdDev {
    pub ddof: usize,
}

impl Default for StdDev {
    fn default() -> Self {
        Self { ddof: 1 }
    }
}

impl WindowStatistic for StdDev {
    fn name(&self) -> String {
        "std".into()
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64> {
        Variance { ddof: self.ddof }.evaluate(span).map(f64::sqrt)
    }
}

/// Standard deviation over mean. Absent when the window mean is zero.
#[derive(Debug, Clone, Copy)]
pub struct CoefficientOfVariation {
    pub ddof: usize,
}

impl Default for CoefficientOfVariation {
    fn default() -> Self {
        Self { ddof: 1 }
    }
}

impl WindowStatistic for CoefficientOfVariation {
    fn name(&self) -> String {
        "cv".into()
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64> {
        let m = mean(span);
        if m == 0.0 {
            return None;
        }
        StdDev { ddof: self.ddof }.evaluate(span).map(|s| s / m)
    }
}

/// Pearson correlation between the window and the window shifted back by `lag`.
///
/// For the window `x[i-W+1..=i]` the pairs are `(x[j], x[j-lag])`, so `lag`
/// points of history before the window are read. The denominator uses the
/// standard deviations of the two windowed sub-series, not of the whole
/// sequence.
#[derive(Debug, Clone, Copy)]
pub struct LagAutocorrelation {
    pub lag: usize,
}

impl Default for LagAutocorrelation {
    fn default() -> Self {
        Self { lag: 1 }
    }
}

impl WindowStatistic for LagAutocorrelation {
    fn name(&self) -> String {
        format!("acf{}", self.lag)
    }

    fn lookback(&self) -> usize {
        self.lag
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64> {
        let width = span.len().checked_sub(self.lag)?;
        if width == 0 {
            return None;
        }
        let current = &span[self.lag..];
        let lagged = &span[..width];
        if is_constant(current) || is_constant(lagged) {
            return None;
        }

        let (mc, ssc) = sum_sq_dev(current);
        let (ml, ssl) = sum_sq_dev(lagged);
        if ssc <= 0.0 || ssl <= 0.0 {
            return None;
        }
        let cov: f64 = current
            .iter()
            .zip(lagged)
            .map(|(&a, &b)| (a - mc) * (b - ml))
            .sum();
        Some((cov / (ssc * ssl).sqrt()).clamp(-1.0, 1.0))
    }
}

/// Early-warning indicator selectable by name in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Mean,
    Variance,
    StdDev,
    CoefficientOfVariation,
    Autocorrelation { lag: usize },
}

impl Indicator {
    /// Output column name for this indicator over `variable`.
    pub fn column_name(&self, variable: &str) -> String {
        let suffix = match self {
            Indicator::Mean => "mean".to_string(),
            Indicator::Variance => "variance".to_string(),
            Indicator::StdDev => "std".to_string(),
            Indicator::CoefficientOfVariation => "cv".to_string(),
            Indicator::Autocorrelation { lag } => format!("acf{lag}"),
        };
        format!("{variable}_{suffix}")
    }

    pub fn compute(&self, values: &[f64], width: usize) -> StatsResult<RollingSeries> {
        match *self {
            Indicator::Mean => rolling(values, width, &Mean),
            Indicator::Variance => rolling(values, width, &Variance::default()),
            Indicator::StdDev => rolling(values, width, &StdDev::default()),
            Indicator::CoefficientOfVariation => {
                rolling(values, width, &CoefficientOfVariation::default())
            }
            Indicator::Autocorrelation { lag } => {
                if lag < 1 {
                    return Err(StatsError::config("autocorrelation lag must be at least 1"));
                }
                rolling(values, width, &LagAutocorrelation { lag })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    #[test]
    fn rolling_mean_and_sample_variance() {
        let v = [1.0, 2.0, 4.0, 7.0];
        let m = rolling(&v, 3, &Mean).unwrap();
        assert_eq!(m.values[..2], [None, None]);
        assert!(close(m.values[2], 7.0 / 3.0));
        assert!(close(m.values[3], 13.0 / 3.0));

        let var = rolling(&v, 3, &Variance::default()).unwrap();
        // [1,2,4]: mean 7/3, ss = 16/9 + 1/9 + 25/9 = 42/9, /2
        assert!(close(var.values[2], 42.0 / 18.0));
        let pop = rolling(&v, 3, &Variance { ddof: 0 }).unwrap();
        assert!(close(pop.values[2], 42.0 / 27.0));
    }

    #[test]
    fn sample_variance_needs_two_points() {
        let var = rolling(&[1.0, 2.0], 1, &Variance::default()).unwrap();
        assert_eq!(var.values, vec![None, None]);
        let pop = rolling(&[1.0, 2.0], 1, &Variance { ddof: 0 }).unwrap();
        assert_eq!(pop.values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn constant_window_has_zero_spread() {
        let v = [0.1; 6];
        let sd = rolling(&v, 3, &StdDev::default()).unwrap();
        assert!(sd.values[2..].iter().all(|&s| s == Some(0.0)));
        let acf = rolling(&v, 3, &LagAutocorrelation::default()).unwrap();
        assert!(acf.values.iter().all(Option::is_none));
    }

    #[test]
    fn cv_is_std_over_mean() {
        let v = [2.0, 4.0, 6.0];
        let cv = rolling(&v, 3, &CoefficientOfVariation::default()).unwrap();
        assert!(close(cv.values[2], 2.0 / 4.0));
        let centered = rolling(&[-1.0, 0.0, 1.0], 3, &CoefficientOfVariation::default()).unwrap();
        assert_eq!(centered.values[2], None);
    }

    #[test]
    fn autocorrelation_alignment_and_sign() {
        let v: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let acf = rolling(&v, 4, &LagAutocorrelation { lag: 1 }).unwrap();
        assert_eq!(acf.leading_absent(), 4);
        assert!(acf.values[4..].iter().all(|&r| close(r, 1.0)));

        let alt: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf = rolling(&alt, 5, &LagAutocorrelation { lag: 1 }).unwrap();
        assert!(acf.values[5..].iter().all(|&r| close(r, -1.0)));
    }

    #[test]
    fn autocorrelation_uses_windowed_spread() {
        // Window [1,3,2] against lagged [0,1,3]:
        // current mean 2, lagged mean 4/3; cov = (-1)(-4/3) + (1)(-1/3) + 0 = 1
        // ssc = 2, ssl = 16/9 + 1/9 + 25/9 = 42/9
        let v = [0.0, 1.0, 3.0, 2.0];
        let acf = rolling(&v, 3, &LagAutocorrelation { lag: 1 }).unwrap();
        assert_eq!(acf.values[..3], [None, None, None]);
        assert!(close(acf.values[3], 1.0 / (2.0_f64 * 42.0 / 9.0).sqrt()));
    }

    #[test]
    fn indicator_columns_and_lag_validation() {
        assert_eq!(Indicator::Variance.column_name("x"), "x_variance");
        assert_eq!(
            Indicator::Autocorrelation { lag: 2 }.column_name("n"),
            "n_acf2"
        );
        assert!(matches!(
            Indicator::Autocorrelation { lag: 0 }.compute(&[1.0, 2.0, 3.0], 2),
            Err(StatsError::Configuration { .. })
        ));
    }

    #[test]
    fn indicator_serde_names() {
        let json = serde_json::to_string(&Indicator::CoefficientOfVariation).unwrap();
        assert_eq!(json, "\"coefficient_of_variation\"");
        let back: Indicator = serde_json::from_str(r#"{"autocorrelation":{"lag":3}}"#).unwrap();
        assert_eq!(back, Indicator::Autocorrelation { lag: 3 });
    }
}
