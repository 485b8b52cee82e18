use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Configuration faults detected before any simulation step executes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid configuration: {what}")]
    Configuration { what: String },

    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Unknown state variable: {name}")]
    UnknownVariable { name: String },

    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

impl CoreError {
    pub fn config(what: impl Into<String>) -> Self {
        CoreError::Configuration { what: what.into() }
    }
}
