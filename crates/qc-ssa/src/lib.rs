//! Exact simulation of continuous-time Markov jump processes.
//!
//! Provides:
//! - Transition deltas and the `JumpModel` trait for pluggable rate functions
//! - Closure-backed `JumpProcess`
//! - Gillespie direct method with explicit random stream
//! - Parallel replicate runner with per-replicate derived seeds

pub mod error;
pub mod model;
pub mod replicates;
pub mod ssa;

pub use error::{SsaError, SsaResult};
pub use model::{JumpModel, JumpProcess, Transition};
pub use replicates::{run_replicates, sample_replicates};
pub use ssa::{DirectMethod, SsaConfig, SsaRun, Termination, simulate};
