//! Integration test: coupled two-variable maps.
//!
//! Checks:
//! - zero-noise runs equal an independently computed synchronous iteration
//! - identical seeds reproduce identical trajectories
//! - one normal draw per variable per step, even at zero scale
//! - fractional powers survive because the floor is applied before the next drift

use qc_core::{Params, SimRng, stream};
use qc_map::{ClampPolicy, Domain, MapConfig, MapModel, NoiseScale, run_map};
use rand::Rng;
use rand_distr::StandardNormal;

fn predator_prey() -> MapModel {
    MapModel::builder()
        .variable("prey", |s, p, _| {
            let (n, m) = (s[0], s[1]);
            n + p["r"] * n * (1.0 - n / p["K"]) - p["a"] * n * m
        })
        .variable("predator", |s, p, _| {
            let (n, m) = (s[0], s[1]);
            m + p["b"] * n * m - p["d"] * m
        })
        .requiring(["r", "K", "a", "b", "d"])
        .build()
        .unwrap()
}

fn params() -> Params {
    Params::new()
        .with("r", 0.5)
        .with("K", 1.0)
        .with("a", 0.8)
        .with("b", 0.6)
        .with("d", 0.3)
}

fn config(steps: usize, sigma: f64, seed: u64) -> MapConfig {
    MapConfig {
        steps,
        seed,
        noise: [
            ("prey".to_string(), NoiseScale::Constant(sigma)),
            ("predator".to_string(), NoiseScale::Constant(sigma)),
        ]
        .into(),
        ..MapConfig::default()
    }
}

#[test]
fn zero_noise_matches_synchronous_reference() {
    let p = params();
    let traj = run_map(&predator_prey(), &p, &[0.4, 0.2], &config(60, 0.0, 3)).unwrap();

    let (mut n, mut m) = (0.4_f64, 0.2_f64);
    for i in 0..60 {
        assert_eq!(traj.state(i), &[n, m], "step {i}");
        let next_n = n + 0.5 * n * (1.0 - n / 1.0) - 0.8 * n * m;
        let next_m = m + 0.6 * n * m - 0.3 * m;
        n = next_n;
        m = next_m;
    }
}

#[test]
fn sequential_update_would_differ() {
    // Guard that the reference above actually distinguishes update orders.
    let (n, m) = (0.4_f64, 0.2_f64);
    let next_n = n + 0.5 * n * (1.0 - n) - 0.8 * n * m;
    let sync_m = m + 0.6 * n * m - 0.3 * m;
    let seq_m = m + 0.6 * next_n * m - 0.3 * m;
    assert_ne!(sync_m, seq_m);

    let traj = run_map(&predator_prey(), &params(), &[n, m], &config(2, 0.0, 0)).unwrap();
    assert_eq!(traj.state(1)[1], sync_m);
}

#[test]
fn same_seed_same_trajectory() {
    let model = predator_prey();
    let p = params();
    let a = run_map(&model, &p, &[0.4, 0.2], &config(200, 0.01, 77)).unwrap();
    let b = run_map(&model, &p, &[0.4, 0.2], &config(200, 0.01, 77)).unwrap();
    let c = run_map(&model, &p, &[0.4, 0.2], &config(200, 0.01, 78)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn draws_follow_declaration_order() {
    // Identity drift: each step adds sigma_i * z in declaration order.
    let model = MapModel::builder()
        .variable("a", |s, _, _| s[0])
        .variable("b", |s, _, _| s[1])
        .build()
        .unwrap();
    let cfg = MapConfig {
        steps: 4,
        seed: 11,
        noise: [
            ("a".to_string(), NoiseScale::Constant(0.0)),
            ("b".to_string(), NoiseScale::Constant(1.0)),
        ]
        .into(),
        ..MapConfig::default()
    };
    let traj = run_map(&model, &Params::new(), &[0.0, 0.0], &cfg).unwrap();

    let mut rng: SimRng = stream(11);
    let mut b = 0.0;
    for step in 1..4 {
        let _za: f64 = rng.sample(StandardNormal);
        let zb: f64 = rng.sample(StandardNormal);
        b += zb;
        assert_eq!(traj.state(step), &[0.0, b]);
    }
}

#[test]
fn floored_state_feeds_fractional_power() {
    let model = MapModel::builder()
        .variable("x", |s, p, _| {
            let x = s[0];
            let q = p["q"];
            x + p["r"] * x * (1.0 - x / p["K"]) - p["c"] * x.powf(q) / (p["h"].powf(q) + x.powf(q))
        })
        .requiring(["r", "K", "c", "h", "q"])
        .build()
        .unwrap();
    let p = Params::new()
        .with("r", 0.3)
        .with("K", 10.0)
        .with("c", 2.0)
        .with("h", 1.0)
        .with("q", 2.5);
    let mut cfg = MapConfig {
        steps: 400,
        seed: 5,
        noise: [("x".to_string(), NoiseScale::Constant(0.4))].into(),
        ..MapConfig::default()
    };
    cfg.domains
        .insert("x".to_string(), Domain::non_negative(ClampPolicy::Floor));

    let traj = run_map(&model, &p, &[0.5], &cfg).unwrap();
    let xs = traj.series("x").unwrap();
    assert_eq!(xs.len(), 400);
    assert!(xs.iter().all(|x| x.is_finite() && *x >= 0.0));
}

mod bounded {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn reflected_logistic_stays_in_domain(
            seed in any::<u64>(),
            r in 0.05f64..1.5,
            sigma in 0.0f64..0.5,
            x0 in 0.0f64..2.0,
        ) {
            let model = MapModel::builder()
                .variable("x", |s, p, _| s[0] + p["r"] * s[0] * (1.0 - s[0]))
                .requiring(["r"])
                .build()
                .unwrap();
            let mut cfg = MapConfig {
                steps: 200,
                seed,
                noise: [("x".to_string(), NoiseScale::Constant(sigma))].into(),
                ..MapConfig::default()
            };
            cfg.domains.insert(
                "x".to_string(),
                Domain { lower: 0.0, upper: 5.0, policy: ClampPolicy::Reflect },
            );
            let traj = run_map(&model, &Params::new().with("r", r), &[x0], &cfg).unwrap();
            prop_assert!(traj.series("x").unwrap().iter().all(|x| (0.0..=5.0).contains(x)));
        }
    }
}
