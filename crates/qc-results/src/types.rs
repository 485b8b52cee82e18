//! Result data types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_id: String,
    pub scenario_name: String,
    pub timestamp: String,
    pub run_kind: RunKind,
    pub engine_version: String,
    pub seed: u64,
    pub replicates: usize,
    /// Stored table names, in write order.
    pub tables: Vec<String>,
    /// Kendall tau of each indicator column against time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indicator_trends: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RunKind {
    Jump {
        horizon: f64,
        /// Events in the first replicate.
        events: usize,
        /// Set when the first replicate stopped early with zero total rate.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exhausted_at: Option<f64>,
    },
    Map {
        steps: usize,
    },
}
