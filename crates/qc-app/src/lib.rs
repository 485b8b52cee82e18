//! Shared application service layer for quasicycle.
//!
//! Frontends go through this crate to load and validate scenario files,
//! execute scenarios end to end, and persist or query stored runs.

pub mod error;
pub mod query;
pub mod run_service;
pub mod scenario_service;

pub use error::{AppError, AppResult};
pub use query::{RunSummary, extract_series, get_run_summary};
pub use run_service::{
    ExecutedRun, RunOptions, RunRequest, RunResponse, ensure_run, execute_scenario, list_runs,
    load_run, map_ensemble_summary,
};
pub use scenario_service::{
    ScenarioSummary, get_scenario, list_scenarios, load_scenarios, validate_scenarios,
};
