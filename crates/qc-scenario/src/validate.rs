//! Scenario validation.
//!
//! Everything here runs before any simulation step: a file that passes is
//! guaranteed to build engine configurations without configuration errors.

use std::collections::{BTreeMap, HashSet};

use crate::models::{self, ModelInfo, ModelKind};
use crate::plan::jump_grid;
use crate::schema::{IndicatorsDef, NoiseDef, ScenarioDef, ScenarioFile, ScenarioKind, TheoryDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Unknown model: {model} in scenario '{scenario}'")]
    UnknownModel { model: String, scenario: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Missing parameter: {name} in scenario '{scenario}'")]
    MissingParameter { name: String, scenario: String },

    #[error("Missing noise specification for variable '{variable}' in scenario '{scenario}'")]
    MissingNoise { variable: String, scenario: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_file(file: &ScenarioFile) -> Result<(), ValidationError> {
    if file.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut ids = HashSet::new();
    for scenario in &file.scenarios {
        if !ids.insert(&scenario.id) {
            return Err(ValidationError::DuplicateId {
                id: scenario.id.clone(),
                context: "scenarios".to_string(),
            });
        }
        validate_scenario(scenario)?;
    }
    Ok(())
}

pub fn validate_scenario(scenario: &ScenarioDef) -> Result<(), ValidationError> {
    let sid = &scenario.id;
    if sid.trim().is_empty() {
        return Err(invalid("scenario id", sid, "must not be empty"));
    }

    let model = scenario.kind.model();
    let info = models::lookup(model).ok_or_else(|| ValidationError::UnknownModel {
        model: model.to_string(),
        scenario: sid.clone(),
    })?;

    for name in info.params {
        let value = scenario.params.get(*name).ok_or_else(|| {
            ValidationError::MissingParameter {
                name: name.to_string(),
                scenario: sid.clone(),
            }
        })?;
        finite(&format!("scenario '{sid}' param {name}"), *value)?;
    }

    if scenario.kind.replicates() == 0 {
        return Err(invalid(
            &format!("scenario '{sid}' replicates"),
            0,
            "must be at least 1",
        ));
    }

    let series_len = match &scenario.kind {
        ScenarioKind::Jump {
            initial,
            horizon,
            grid_step,
            ..
        } => {
            expect_kind(info, ModelKind::Jump, sid)?;
            check_initial(info, initial, sid)?;
            for (var, n) in initial {
                if *n < 0 {
                    return Err(invalid(
                        &format!("scenario '{sid}' initial {var}"),
                        n,
                        "counts must be non-negative",
                    ));
                }
            }
            positive(&format!("scenario '{sid}' horizon"), *horizon)?;
            if let Some(step) = grid_step {
                positive(&format!("scenario '{sid}' grid_step"), *step)?;
            }
            // Replicates are summarized on the sampling grid. A single run's
            // event count is only known after simulating.
            (scenario.kind.replicates() > 1).then(|| jump_grid(*horizon, *grid_step).len())
        }
        ScenarioKind::Map {
            initial,
            steps,
            noise,
            domain,
            ramps,
            theory,
            ..
        } => {
            expect_kind(info, ModelKind::Map, sid)?;
            check_initial(info, initial, sid)?;
            for (var, x) in initial {
                finite(&format!("scenario '{sid}' initial {var}"), *x)?;
            }
            if *steps == 0 {
                return Err(invalid(
                    &format!("scenario '{sid}' steps"),
                    steps,
                    "must be at least 1",
                ));
            }

            for var in info.variables {
                if !noise.contains_key(*var) {
                    return Err(ValidationError::MissingNoise {
                        variable: var.to_string(),
                        scenario: sid.clone(),
                    });
                }
            }
            check_keys(info, noise, sid, "noise")?;
            for (var, def) in noise {
                let field = format!("scenario '{sid}' noise {var}");
                match *def {
                    NoiseDef::Constant(s) => non_negative(&field, s)?,
                    NoiseDef::Linear { from, to } => {
                        non_negative(&field, from)?;
                        non_negative(&field, to)?;
                    }
                }
            }

            check_keys(info, domain, sid, "domain")?;
            for var in info.variables {
                // Unset bounds default to [0, inf).
                let d = domain.get(*var);
                let lower = d.and_then(|d| d.lower).unwrap_or(0.0);
                let upper = d.and_then(|d| d.upper).unwrap_or(f64::INFINITY);
                if lower.is_nan() || upper.is_nan() || lower > upper {
                    return Err(invalid(
                        &format!("scenario '{sid}' domain {var}"),
                        format!("[{lower}, {upper}]"),
                        "lower bound must not exceed upper bound",
                    ));
                }
                if let Some(x) = initial.get(*var)
                    && !(lower..=upper).contains(x)
                {
                    return Err(invalid(
                        &format!("scenario '{sid}' initial {var}"),
                        x,
                        &format!("outside domain [{lower}, {upper}]"),
                    ));
                }
            }

            for ramp in ramps {
                if !info.params.contains(&ramp.param.as_str()) {
                    return Err(ValidationError::MissingReference {
                        id: ramp.param.clone(),
                        context: format!("scenario '{sid}' ramp param"),
                    });
                }
                finite(&format!("scenario '{sid}' ramp {} from", ramp.param), ramp.from)?;
                finite(&format!("scenario '{sid}' ramp {} to", ramp.param), ramp.to)?;
            }

            if let Some(theory) = theory {
                validate_theory(theory, info, noise, sid)?;
            }
            Some(*steps)
        }
    };

    if let Some(ind) = &scenario.indicators {
        validate_indicators(ind, info, series_len, sid)?;
    }
    Ok(())
}

fn validate_theory(
    theory: &TheoryDef,
    info: &ModelInfo,
    noise: &BTreeMap<String, NoiseDef>,
    sid: &str,
) -> Result<(), ValidationError> {
    match theory {
        TheoryDef::Value { value } => finite(&format!("scenario '{sid}' theory value"), *value),
        TheoryDef::LogisticNoiseEquilibrium { variable } => {
            if !info.variables.contains(&variable.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: variable.clone(),
                    context: format!("scenario '{sid}' theory variable"),
                });
            }
            if !info.params.contains(&"K") {
                return Err(ValidationError::MissingParameter {
                    name: "K".to_string(),
                    scenario: sid.to_string(),
                });
            }
            if !matches!(noise.get(variable), Some(NoiseDef::Constant(_))) {
                return Err(invalid(
                    &format!("scenario '{sid}' theory"),
                    variable,
                    "logistic equilibrium needs constant noise",
                ));
            }
            Ok(())
        }
    }
}

fn validate_indicators(
    ind: &IndicatorsDef,
    info: &ModelInfo,
    series_len: Option<usize>,
    sid: &str,
) -> Result<(), ValidationError> {
    if !info.variables.contains(&ind.variable.as_str()) {
        return Err(ValidationError::MissingReference {
            id: ind.variable.clone(),
            context: format!("scenario '{sid}' indicators variable"),
        });
    }
    if ind.width < 1 {
        return Err(invalid(
            &format!("scenario '{sid}' indicators width"),
            ind.width,
            "must be at least 1",
        ));
    }
    if let Some(n) = series_len
        && ind.width > n
    {
        return Err(invalid(
            &format!("scenario '{sid}' indicators width"),
            ind.width,
            &format!("exceeds series length {n}"),
        ));
    }
    if ind.lag < 1 {
        return Err(invalid(
            &format!("scenario '{sid}' indicators lag"),
            ind.lag,
            "must be at least 1",
        ));
    }
    if ind.kinds.is_empty() {
        return Err(invalid(
            &format!("scenario '{sid}' indicators kinds"),
            "[]",
            "must list at least one indicator",
        ));
    }
    Ok(())
}

fn expect_kind(info: &ModelInfo, kind: ModelKind, sid: &str) -> Result<(), ValidationError> {
    if info.kind != kind {
        return Err(invalid(
            &format!("scenario '{sid}' model"),
            info.name,
            &format!("is a {:?} model", info.kind),
        ));
    }
    Ok(())
}

/// Reject keys that are not model variables.
fn check_keys<T>(
    info: &ModelInfo,
    values: &BTreeMap<String, T>,
    sid: &str,
    what: &str,
) -> Result<(), ValidationError> {
    for key in values.keys() {
        if !info.variables.contains(&key.as_str()) {
            return Err(ValidationError::MissingReference {
                id: key.clone(),
                context: format!("scenario '{sid}' {what} (model '{}')", info.name),
            });
        }
    }
    Ok(())
}

fn check_initial<T>(
    info: &ModelInfo,
    initial: &BTreeMap<String, T>,
    sid: &str,
) -> Result<(), ValidationError> {
    check_keys(info, initial, sid, "initial")?;
    for var in info.variables {
        if !initial.contains_key(*var) {
            return Err(invalid(
                &format!("scenario '{sid}' initial"),
                var,
                "missing initial value",
            ));
        }
    }
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be non-negative and finite"));
    }
    Ok(())
}
