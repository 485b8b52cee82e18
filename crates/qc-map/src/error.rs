//! Error types for recursive-map simulation.

use thiserror::Error;

/// Errors encountered while iterating a stochastic map.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Domain violation at step {step}: {variable} = {value}")]
    DomainViolation {
        step: usize,
        variable: String,
        value: f64,
    },

    #[error(transparent)]
    Config(#[from] qc_core::CoreError),
}

pub type MapResult<T> = Result<T, MapError>;
