//! Generic trailing-window reduction.

use serde::Serialize;

use crate::error::{StatsError, StatsResult};

/// Aggregate evaluated over one trailing window.
///
/// `evaluate` receives `lookback() + width` consecutive values ending at the
/// current index; the window proper is the last `width` of them. Returning
/// `None` marks the entry absent (e.g. a constant window for a correlation).
pub trait WindowStatistic {
    fn name(&self) -> String;

    /// Extra history needed before the window starts.
    fn lookback(&self) -> usize {
        0
    }

    fn evaluate(&self, span: &[f64]) -> Option<f64>;
}

/// A statistic aligned with its source sequence.
///
/// `values[i]` is the statistic over the window ending at source index `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub name: String,
    pub width: usize,
    pub values: Vec<Option<f64>>,
}

impl RollingSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of leading absent entries.
    pub fn leading_absent(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }

    /// `(index, value)` for every defined entry.
    pub fn defined(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }
}

/// Apply `stat` over every trailing window of `width` in `values`.
///
/// The output has the same length as `values`. Entries without enough history
/// (the first `width - 1 + stat.lookback()`) are absent. Fails before computing
/// anything when `width` is zero or exceeds the sequence length.
pub fn rolling<S: WindowStatistic + ?Sized>(
    values: &[f64],
    width: usize,
    stat: &S,
) -> StatsResult<RollingSeries> {
    let n = values.len();
    if width < 1 {
        return Err(StatsError::config("window width must be at least 1"));
    }
    if width > n {
        return Err(StatsError::config(format!(
            "window width {width} exceeds sequence length {n}"
        )));
    }

    let span = width + stat.lookback();
    let out = (0..n)
        .map(|i| {
            if i + 1 < span {
                None
            } else {
                stat.evaluate(&values[i + 1 - span..=i])
            }
        })
        .collect();

    Ok(RollingSeries {
        name: stat.name(),
        width,
        values: out,
    })
}
