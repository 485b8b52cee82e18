//! Discrete-time recursive stochastic maps.
//!
//! Provides:
//! - `DriftModel` trait for pluggable deterministic update rules
//! - Closure-backed `MapModel` with synchronous multi-variable updates
//! - Additive Gaussian noise with constant or linearly varying scale
//! - Domain bounds with reject / floor / reflect clamping
//! - Linear parameter ramps over the run
//! - Seeded single runs and parallel ensembles

pub mod clamp;
pub mod error;
pub mod model;
pub mod noise;
pub mod sim;

mod ensemble;

pub use clamp::{ClampPolicy, Domain};
pub use ensemble::{fold_ensemble, run_ensemble};
pub use error::{MapError, MapResult};
pub use model::{DriftModel, MapModel, MapModelBuilder};
pub use noise::NoiseScale;
pub use sim::{MapConfig, ParamRamp, RecursiveMap, run_map};
