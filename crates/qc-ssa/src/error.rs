//! Error types for jump-process simulation.

use thiserror::Error;

/// Errors that abort a jump-process run.
///
/// Process exhaustion (total rate zero) is not an error; see
/// [`crate::Termination::Exhausted`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SsaError {
    #[error("Invalid rate for transition {index} at t={time}: {rate} (state {state:?})")]
    InvalidRate {
        index: usize,
        rate: f64,
        time: f64,
        state: Vec<i64>,
    },

    #[error("Rate function returned {got} rates for {expected} transitions at t={time}")]
    RateCountMismatch {
        expected: usize,
        got: usize,
        time: f64,
    },

    #[error("Transition {index} drove a count negative at t={time} (state {state:?})")]
    NegativeCount {
        index: usize,
        time: f64,
        state: Vec<i64>,
    },

    #[error(transparent)]
    Config(#[from] qc_core::CoreError),
}

pub type SsaResult<T> = Result<T, SsaError>;
