//! Scenario file loading, validation, and introspection.

use std::path::Path;

use qc_scenario::{ScenarioDef, ScenarioFile, ScenarioKind};

use crate::error::{AppError, AppResult};

/// Summary of a scenario for listing.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub model: String,
    pub kind: &'static str,
    pub replicates: usize,
    pub seed: u64,
    pub has_indicators: bool,
}

/// Load and validate a scenario file (YAML or JSON by extension).
pub fn load_scenarios(path: &Path) -> AppResult<ScenarioFile> {
    if !path.exists() {
        return Err(AppError::ScenarioFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(qc_scenario::load(path)?)
}

/// Validate an in-memory scenario file.
pub fn validate_scenarios(file: &ScenarioFile) -> AppResult<()> {
    if file.scenarios.is_empty() {
        return Err(AppError::Validation(
            "Scenario file must define at least one scenario".to_string(),
        ));
    }
    qc_scenario::validate_file(file)?;
    Ok(())
}

pub fn list_scenarios(file: &ScenarioFile) -> Vec<ScenarioSummary> {
    file.scenarios
        .iter()
        .map(|s| ScenarioSummary {
            id: s.id.clone(),
            name: s.name.clone(),
            model: s.kind.model().to_string(),
            kind: match s.kind {
                ScenarioKind::Jump { .. } => "jump",
                ScenarioKind::Map { .. } => "map",
            },
            replicates: s.kind.replicates(),
            seed: s.seed,
            has_indicators: s.indicators.is_some(),
        })
        .collect()
}

pub fn get_scenario<'a>(file: &'a ScenarioFile, scenario_id: &str) -> AppResult<&'a ScenarioDef> {
    file.scenario(scenario_id)
        .ok_or_else(|| AppError::ScenarioNotFound(scenario_id.to_string()))
}
