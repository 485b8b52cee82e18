use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Replicate {replicate} does not match the first: {what}")]
    ReplicateMismatch { replicate: usize, what: &'static str },

    #[error(transparent)]
    Core(#[from] qc_core::CoreError),
}

impl StatsError {
    pub fn config(what: impl Into<String>) -> Self {
        StatsError::Configuration { what: what.into() }
    }
}

pub type StatsResult<T> = Result<T, StatsError>;
