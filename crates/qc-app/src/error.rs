//! Error types for the qc-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and gives
/// frontends one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for qc-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<qc_scenario::ScenarioError> for AppError {
    fn from(err: qc_scenario::ScenarioError) -> Self {
        match err {
            qc_scenario::ScenarioError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<qc_scenario::ValidationError> for AppError {
    fn from(err: qc_scenario::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<qc_core::CoreError> for AppError {
    fn from(err: qc_core::CoreError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<qc_ssa::SsaError> for AppError {
    fn from(err: qc_ssa::SsaError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<qc_map::MapError> for AppError {
    fn from(err: qc_map::MapError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<qc_stats::StatsError> for AppError {
    fn from(err: qc_stats::StatsError) -> Self {
        AppError::Statistics(err.to_string())
    }
}

impl From<qc_results::ResultsError> for AppError {
    fn from(err: qc_results::ResultsError) -> Self {
        match err {
            qc_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
