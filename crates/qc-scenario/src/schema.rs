//! Scenario file schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

impl ScenarioFile {
    pub fn scenario(&self, id: &str) -> Option<&ScenarioDef> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    pub kind: ScenarioKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorsDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ScenarioKind {
    Jump {
        model: String,
        initial: BTreeMap<String, i64>,
        horizon: f64,
        #[serde(default = "default_replicates")]
        replicates: usize,
        /// Spacing of the shared grid replicates are sampled onto.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grid_step: Option<f64>,
    },
    Map {
        model: String,
        initial: BTreeMap<String, f64>,
        steps: usize,
        noise: BTreeMap<String, NoiseDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clamp: Option<ClampDef>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        domain: BTreeMap<String, DomainDef>,
        #[serde(default = "default_replicates")]
        replicates: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ramps: Vec<RampDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        theory: Option<TheoryDef>,
    },
}

fn default_replicates() -> usize {
    1
}

impl ScenarioKind {
    pub fn model(&self) -> &str {
        match self {
            ScenarioKind::Jump { model, .. } | ScenarioKind::Map { model, .. } => model,
        }
    }

    pub fn replicates(&self) -> usize {
        match self {
            ScenarioKind::Jump { replicates, .. } | ScenarioKind::Map { replicates, .. } => {
                *replicates
            }
        }
    }

    pub fn set_replicates(&mut self, n: usize) {
        match self {
            ScenarioKind::Jump { replicates, .. } | ScenarioKind::Map { replicates, .. } => {
                *replicates = n
            }
        }
    }
}

/// Per-variable noise: a bare number, or `{ from, to }` for a linear sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NoiseDef {
    Constant(f64),
    Linear { from: f64, to: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClampDef {
    Reject,
    Floor,
    Reflect,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DomainDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RampDef {
    pub param: String,
    pub from: f64,
    pub to: f64,
}

/// Closed-form value joined against the ensemble mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TheoryDef {
    Value { value: f64 },
    /// `K·(1 + sqrt(1 - 8σ²/K²)) / 2` for the noisy logistic map.
    LogisticNoiseEquilibrium { variable: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorsDef {
    pub variable: String,
    pub width: usize,
    #[serde(default = "default_lag")]
    pub lag: usize,
    pub kinds: Vec<IndicatorKind>,
}

fn default_lag() -> usize {
    1
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Mean,
    Variance,
    #[serde(alias = "std")]
    StdDev,
    #[serde(alias = "cv")]
    CoefficientOfVariation,
    #[serde(alias = "acf")]
    Autocorrelation,
}

impl IndicatorsDef {
    pub fn indicators(&self) -> Vec<qc_stats::Indicator> {
        use qc_stats::Indicator;
        self.kinds
            .iter()
            .map(|k| match k {
                IndicatorKind::Mean => Indicator::Mean,
                IndicatorKind::Variance => Indicator::Variance,
                IndicatorKind::StdDev => Indicator::StdDev,
                IndicatorKind::CoefficientOfVariation => Indicator::CoefficientOfVariation,
                IndicatorKind::Autocorrelation => Indicator::Autocorrelation { lag: self.lag },
            })
            .collect()
    }
}
