//! Built-in rate and drift functions, selected by name from scenario files.

use qc_core::{CoreResult, StateLayout};
use qc_map::MapModel;
use qc_ssa::{JumpProcess, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Jump,
    Map,
}

/// Static description of a built-in model.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub name: &'static str,
    pub kind: ModelKind,
    pub variables: &'static [&'static str],
    pub params: &'static [&'static str],
    pub description: &'static str,
}

pub const CATALOG: &[ModelInfo] = &[
    ModelInfo {
        name: "levins",
        kind: ModelKind::Jump,
        variables: &["n"],
        params: &["c", "e", "N"],
        description: "patch occupancy: colonization c·n·(1-n/N), extinction e·n",
    },
    ModelInfo {
        name: "birth_death",
        kind: ModelKind::Jump,
        variables: &["n"],
        params: &["b", "d"],
        description: "linear birth b·n and death d·n",
    },
    ModelInfo {
        name: "logistic",
        kind: ModelKind::Map,
        variables: &["x"],
        params: &["r", "K"],
        description: "x + r·x·(1-x/K)",
    },
    ModelInfo {
        name: "predator_prey",
        kind: ModelKind::Map,
        variables: &["prey", "predator"],
        params: &["r", "K", "a", "b", "d"],
        description: "discrete Lotka-Volterra with logistic prey",
    },
    ModelInfo {
        name: "grazing",
        kind: ModelKind::Map,
        variables: &["x"],
        params: &["r", "K", "c", "h", "q"],
        description: "logistic vegetation with sigmoidal consumption c·x^q/(h^q+x^q)",
    },
    ModelInfo {
        name: "yeast_dilution",
        kind: ModelKind::Map,
        variables: &["x"],
        params: &["g", "A", "K", "D"],
        description: "daily growth min(K, g·x²/(x+A)) then dilution by D",
    },
];

pub fn lookup(name: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|m| m.name == name)
}

/// Build the jump process registered under `name`. `None` if unknown or not a
/// jump model.
pub fn jump_model(name: &str) -> Option<CoreResult<JumpProcess>> {
    let model = match name {
        "levins" => levins(),
        "birth_death" => birth_death(),
        _ => return None,
    };
    Some(model)
}

/// Build the map registered under `name`. `None` if unknown or not a map.
pub fn map_model(name: &str) -> Option<CoreResult<MapModel>> {
    let model = match name {
        "logistic" => logistic(),
        "predator_prey" => predator_prey(),
        "grazing" => grazing(),
        "yeast_dilution" => yeast_dilution(),
        _ => return None,
    };
    Some(model)
}

fn births_and_deaths() -> Vec<Transition> {
    vec![Transition::new("birth", vec![1]), Transition::new("death", vec![-1])]
}

fn levins() -> CoreResult<JumpProcess> {
    Ok(JumpProcess::new(StateLayout::new(["n"])?, births_and_deaths(), |s, p, _| {
        let n = s[0] as f64;
        // Above capacity the colonization term would go negative.
        let colonize = (p["c"] * n * (1.0 - n / p["N"])).max(0.0);
        vec![colonize, p["e"] * n]
    })?
    .requiring(["c", "e", "N"]))
}

fn birth_death() -> CoreResult<JumpProcess> {
    Ok(JumpProcess::new(StateLayout::new(["n"])?, births_and_deaths(), |s, p, _| {
        let n = s[0] as f64;
        vec![p["b"] * n, p["d"] * n]
    })?
    .requiring(["b", "d"]))
}

fn logistic() -> CoreResult<MapModel> {
    MapModel::builder()
        .variable("x", |s, p, _| {
            let x = s[0];
            x + p["r"] * x * (1.0 - x / p["K"])
        })
        .requiring(["r", "K"])
        .build()
}

fn predator_prey() -> CoreResult<MapModel> {
    MapModel::builder()
        .variable("prey", |s, p, _| {
            let (n, m) = (s[0], s[1]);
            n + p["r"] * n * (1.0 - n / p["K"]) - p["a"] * n * m
        })
        .variable("predator", |s, p, _| {
            let (n, m) = (s[0], s[1]);
            m + p["b"] * n * m - p["d"] * m
        })
        .requiring(["r", "K", "a", "b", "d"])
        .build()
}

fn grazing() -> CoreResult<MapModel> {
    MapModel::builder()
        .variable("x", |s, p, _| {
            let x = s[0];
            let q = p["q"];
            let xq = x.powf(q);
            x + p["r"] * x * (1.0 - x / p["K"]) - p["c"] * xq / (p["h"].powf(q) + xq)
        })
        .requiring(["r", "K", "c", "h", "q"])
        .build()
}

fn yeast_dilution() -> CoreResult<MapModel> {
    MapModel::builder()
        .variable("x", |s, p, _| {
            let x = s[0];
            (p["g"] * x * x / (x + p["A"])).min(p["K"]) / p["D"]
        })
        .requiring(["g", "A", "K", "D"])
        .build()
}
