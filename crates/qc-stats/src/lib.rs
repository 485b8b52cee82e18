//! Sliding-window statistics and early-warning indicators.
//!
//! One generic trailing-window reduction (`rolling`) parameterized by a
//! `WindowStatistic`; the indicator set, a Kendall-tau trend test and
//! cross-replicate summaries are built on top of it.

pub mod ensemble;
pub mod error;
pub mod indicators;
pub mod trend;
pub mod window;

pub use ensemble::{EnsembleAccumulator, EnsembleSummary};
pub use error::{StatsError, StatsResult};
pub use indicators::{
    CoefficientOfVariation, Indicator, LagAutocorrelation, Mean, StdDev, Variance,
};
pub use trend::kendall_tau;
pub use window::{RollingSeries, WindowStatistic, rolling};
