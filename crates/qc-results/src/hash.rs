//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the scenario's JSON form and the engine version.
///
/// Anything that changes the simulated output (seed, parameters, replicate
/// count) must be part of `scenario` for cached runs to stay valid.
pub fn compute_run_id<S: Serialize>(scenario: &S, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());
    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
