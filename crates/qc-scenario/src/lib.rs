//! qc-scenario: scenario file format, validation and the built-in model library.

pub mod models;
pub mod plan;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use models::{CATALOG, ModelInfo, ModelKind};
pub use plan::{JumpPlan, MapPlan, Plan, jump_grid, plan, time_grid};
pub use schema::*;
pub use validate::{ValidationError, validate_file, validate_scenario};

pub const LATEST_VERSION: u32 = 1;

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] qc_core::CoreError),

    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ScenarioResult<ScenarioFile> {
    let content = std::fs::read_to_string(path)?;
    let file: ScenarioFile = serde_yaml::from_str(&content)?;
    validate_file(&file)?;
    tracing::debug!(path = %path.display(), scenarios = file.scenarios.len(), "loaded scenario file");
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &ScenarioFile) -> ScenarioResult<()> {
    validate_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ScenarioResult<ScenarioFile> {
    let content = std::fs::read_to_string(path)?;
    let file: ScenarioFile = serde_json::from_str(&content)?;
    validate_file(&file)?;
    tracing::debug!(path = %path.display(), scenarios = file.scenarios.len(), "loaded scenario file");
    Ok(file)
}

pub fn save_json(path: &Path, file: &ScenarioFile) -> ScenarioResult<()> {
    validate_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.yaml`/`.yml` or `.json`.
pub fn load(path: &Path) -> ScenarioResult<ScenarioFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => load_yaml(path),
        Some("json") => load_json(path),
        other => Err(ScenarioError::UnsupportedFormat(
            other.unwrap_or("").to_string(),
        )),
    }
}
