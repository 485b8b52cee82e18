//! Integration test: rolling output alignment across the indicator set.

use proptest::prelude::*;
use qc_stats::{Indicator, LagAutocorrelation, Variance, kendall_tau, rolling};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn variance_has_exactly_width_minus_one_absent(
        values in prop::collection::vec(-1e3f64..1e3, 2..200),
        frac in 0.0f64..1.0,
    ) {
        let n = values.len();
        let width = 2 + ((n - 2) as f64 * frac) as usize;
        let r = rolling(&values, width, &Variance::default()).unwrap();
        prop_assert_eq!(r.len(), n);
        prop_assert_eq!(r.leading_absent(), width - 1);
        prop_assert!(r.values[width - 1..].iter().all(|v| v.is_some_and(|v| v >= 0.0)));
    }

    #[test]
    fn autocorrelation_is_bounded_and_offset_by_lag(
        values in prop::collection::vec(-10.0f64..10.0, 12..100),
        width in 2usize..8,
        lag in 1usize..4,
    ) {
        let r = rolling(&values, width, &LagAutocorrelation { lag }).unwrap();
        prop_assert_eq!(r.len(), values.len());
        let first = width - 1 + lag;
        prop_assert!(r.values[..first].iter().all(Option::is_none));

        for i in first..values.len() {
            let current = &values[i + 1 - width..=i];
            let lagged = &values[i + 1 - width - lag..=i - lag];
            let varies = |w: &[f64]| w.iter().any(|&v| v != w[0]);
            if varies(current) && varies(lagged) {
                prop_assert!(r.values[i].is_some(), "entry {} absent", i);
            } else {
                prop_assert!(r.values[i].is_none(), "entry {} over a constant window", i);
            }
        }
        for (_, v) in r.defined() {
            prop_assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn autocorrelation_defined_on_stepped_series(
        steps in prop::collection::vec(1i32..5, 12..60),
        width in 2usize..8,
    ) {
        // Strictly increasing, so no window is constant.
        let values: Vec<f64> = steps
            .iter()
            .scan(0.0, |acc, &d| {
                *acc += f64::from(d);
                Some(*acc)
            })
            .collect();
        let r = rolling(&values, width, &LagAutocorrelation { lag: 1 }).unwrap();
        prop_assert_eq!(r.leading_absent(), width);
        prop_assert!(r.values[width..].iter().all(Option::is_some));
    }

    #[test]
    fn rolling_is_pure(values in prop::collection::vec(-5.0f64..5.0, 3..50)) {
        let a = Indicator::StdDev.compute(&values, 3).unwrap();
        let b = Indicator::StdDev.compute(&values, 3).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn rising_variance_has_positive_trend() {
    // Oscillation with growing amplitude.
    let values: Vec<f64> = (0..200)
        .map(|i| {
            let amp = 0.1 + i as f64 / 100.0;
            if i % 2 == 0 { amp } else { -amp }
        })
        .collect();
    let var = Indicator::Variance.compute(&values, 20).unwrap();
    let tau = kendall_tau(&var.values).unwrap();
    assert!(tau > 0.9, "tau = {tau}");
}
