//! qc-results: export tables, CSV rendering and the on-disk run store.

pub mod hash;
pub mod store;
pub mod table;
pub mod types;

pub use hash::compute_run_id;
pub use store::RunStore;
pub use table::{Column, Table, ensemble_table, theory_table, trajectory_table};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Table not found: {table} in run {run_id}")]
    TableNotFound { run_id: String, table: String },

    #[error("Table shape error: {what}")]
    Shape { what: String },

    #[error("CSV parse error at line {line}: {what}")]
    Csv { line: usize, what: String },

    #[error(transparent)]
    Core(#[from] qc_core::CoreError),

    #[error(transparent)]
    Stats(#[from] qc_stats::StatsError),
}
