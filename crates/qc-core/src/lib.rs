//! qc-core: shared foundation for quasicycle.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - params (named model parameters)
//! - state (named variable slots)
//! - trajectory (time-stamped state sequences)
//! - rng (explicit, reproducibly seeded random streams)
//! - error (shared configuration errors)

pub mod error;
pub mod numeric;
pub mod params;
pub mod rng;
pub mod state;
pub mod trajectory;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use params::Params;
pub use rng::{SimRng, derive_seed, stream};
pub use state::StateLayout;
pub use trajectory::{StateValue, Trajectory, TrajectoryRecorder};
