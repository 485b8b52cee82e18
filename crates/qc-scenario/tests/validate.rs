use std::collections::BTreeMap;

use qc_scenario::{
    ClampDef, IndicatorKind, IndicatorsDef, NoiseDef, RampDef, ScenarioDef, ScenarioFile,
    ScenarioKind, ValidationError, validate_file, validate_scenario,
};

fn logistic() -> ScenarioDef {
    ScenarioDef {
        id: "s1".to_string(),
        name: "logistic".to_string(),
        seed: 1,
        params: [("r".to_string(), 0.5), ("K".to_string(), 1.0)].into(),
        kind: ScenarioKind::Map {
            model: "logistic".to_string(),
            initial: [("x".to_string(), 0.5)].into(),
            steps: 100,
            noise: [("x".to_string(), NoiseDef::Constant(0.1))].into(),
            clamp: Some(ClampDef::Floor),
            domain: BTreeMap::new(),
            replicates: 1,
            ramps: Vec::new(),
            theory: None,
        },
        indicators: None,
    }
}

#[test]
fn valid_scenario_passes() {
    validate_scenario(&logistic()).unwrap();
}

#[test]
fn duplicate_ids_rejected() {
    let file = ScenarioFile {
        version: 1,
        name: "dup".to_string(),
        scenarios: vec![logistic(), logistic()],
    };
    assert!(matches!(
        validate_file(&file),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn newer_version_rejected() {
    let file = ScenarioFile {
        version: 99,
        name: "future".to_string(),
        scenarios: vec![],
    };
    assert_eq!(
        validate_file(&file),
        Err(ValidationError::UnsupportedVersion { version: 99 })
    );
}

#[test]
fn unknown_model_rejected() {
    let mut def = logistic();
    if let ScenarioKind::Map { model, .. } = &mut def.kind {
        *model = "ricker".to_string();
    }
    assert!(matches!(
        validate_scenario(&def),
        Err(ValidationError::UnknownModel { .. })
    ));
}

#[test]
fn model_kind_must_match() {
    let mut def = logistic();
    def.kind = ScenarioKind::Jump {
        model: "logistic".to_string(),
        initial: [("x".to_string(), 1)].into(),
        horizon: 10.0,
        replicates: 1,
        grid_step: None,
    };
    assert!(matches!(
        validate_scenario(&def),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn missing_parameter_rejected() {
    let mut def = logistic();
    def.params.remove("K");
    assert_eq!(
        validate_scenario(&def),
        Err(ValidationError::MissingParameter {
            name: "K".to_string(),
            scenario: "s1".to_string(),
        })
    );
}

#[test]
fn missing_noise_rejected() {
    let mut def = logistic();
    if let ScenarioKind::Map { noise, .. } = &mut def.kind {
        noise.clear();
    }
    assert_eq!(
        validate_scenario(&def),
        Err(ValidationError::MissingNoise {
            variable: "x".to_string(),
            scenario: "s1".to_string(),
        })
    );
}

#[test]
fn negative_noise_and_zero_steps_rejected() {
    let mut def = logistic();
    if let ScenarioKind::Map { noise, .. } = &mut def.kind {
        noise.insert("x".to_string(), NoiseDef::Linear { from: 0.1, to: -0.1 });
    }
    assert!(validate_scenario(&def).is_err());

    let mut def = logistic();
    if let ScenarioKind::Map { steps, .. } = &mut def.kind {
        *steps = 0;
    }
    assert!(validate_scenario(&def).is_err());
}

#[test]
fn window_wider_than_run_rejected() {
    let mut def = logistic();
    def.indicators = Some(IndicatorsDef {
        variable: "x".to_string(),
        width: 101,
        lag: 1,
        kinds: vec![IndicatorKind::Variance],
    });
    assert!(validate_scenario(&def).is_err());

    def.indicators = Some(IndicatorsDef {
        variable: "x".to_string(),
        width: 0,
        lag: 1,
        kinds: vec![IndicatorKind::Variance],
    });
    assert!(validate_scenario(&def).is_err());

    def.indicators = Some(IndicatorsDef {
        variable: "x".to_string(),
        width: 100,
        lag: 1,
        kinds: vec![IndicatorKind::Variance],
    });
    validate_scenario(&def).unwrap();
}

fn birth_death(replicates: usize, grid_step: Option<f64>, width: usize) -> ScenarioDef {
    ScenarioDef {
        id: "bd".to_string(),
        name: "birth death".to_string(),
        seed: 3,
        params: [("b".to_string(), 0.9), ("d".to_string(), 1.0)].into(),
        kind: ScenarioKind::Jump {
            model: "birth_death".to_string(),
            initial: [("n".to_string(), 20)].into(),
            horizon: 10.0,
            replicates,
            grid_step,
        },
        indicators: Some(IndicatorsDef {
            variable: "n".to_string(),
            width,
            lag: 1,
            kinds: vec![IndicatorKind::Variance],
        }),
    }
}

#[test]
fn jump_replicate_window_checked_against_grid() {
    // Default grid: 100 intervals, 101 points.
    assert!(matches!(
        validate_scenario(&birth_death(3, None, 500)),
        Err(ValidationError::InvalidValue { .. })
    ));
    validate_scenario(&birth_death(3, None, 101)).unwrap();
    assert!(validate_scenario(&birth_death(3, None, 102)).is_err());

    // grid_step 2.5 over horizon 10: 5 points.
    validate_scenario(&birth_death(3, Some(2.5), 5)).unwrap();
    assert!(validate_scenario(&birth_death(3, Some(2.5), 6)).is_err());

    // Single runs have a random event count; the width is checked at run time.
    validate_scenario(&birth_death(1, None, 500)).unwrap();
}

#[test]
fn ramp_on_unknown_param_rejected() {
    let mut def = logistic();
    if let ScenarioKind::Map { ramps, .. } = &mut def.kind {
        ramps.push(RampDef {
            param: "q".to_string(),
            from: 0.0,
            to: 1.0,
        });
    }
    assert!(matches!(
        validate_scenario(&def),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn initial_below_floor_rejected() {
    let mut def = logistic();
    if let ScenarioKind::Map { initial, .. } = &mut def.kind {
        initial.insert("x".to_string(), -0.1);
    }
    assert!(validate_scenario(&def).is_err());
}

#[test]
fn negative_jump_count_rejected() {
    let mut def = logistic();
    def.params = [("b".to_string(), 1.0), ("d".to_string(), 1.0)].into();
    def.kind = ScenarioKind::Jump {
        model: "birth_death".to_string(),
        initial: [("n".to_string(), -1)].into(),
        horizon: 10.0,
        replicates: 1,
        grid_step: None,
    };
    assert!(validate_scenario(&def).is_err());
}
