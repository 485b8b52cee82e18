//! Named-column tables with a stable column order.
//!
//! Column order is always: `time`, state columns, indicator columns, then
//! parameter echo columns (`param_<name>`), so tables from different scenarios
//! with the same configuration line up.

use std::fmt::Write as _;

use qc_core::{Params, Trajectory};
use qc_stats::EnsembleSummary;
use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

pub const TIME: &str = "time";

/// A named column of optional values, e.g. a rolling indicator.
pub type Column = (String, Vec<Option<f64>>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let j = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[j]).collect())
    }

    pub fn push_row(&mut self, row: Vec<Option<f64>>) -> ResultsResult<()> {
        if row.len() != self.columns.len() {
            return Err(ResultsError::Shape {
                what: format!(
                    "row has {} cells, table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column aligned row-by-row with the table.
    pub fn append_column(&mut self, name: impl Into<String>, values: &[Option<f64>]) -> ResultsResult<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(ResultsError::Shape {
                what: format!(
                    "column '{name}' has {} values, table has {} rows",
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        if self.column_index(&name).is_some() {
            return Err(ResultsError::Shape {
                what: format!("duplicate column '{name}'"),
            });
        }
        self.columns.push(name);
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.push(*v);
        }
        Ok(())
    }

    /// Left join `other`'s non-key columns on the shared `key` column.
    ///
    /// Rows without a match get absent cells. Keys compare exactly.
    pub fn left_join(&mut self, other: &Table, key: &str) -> ResultsResult<()> {
        let missing = |t: &str| ResultsError::Shape {
            what: format!("join key '{key}' missing from {t} table"),
        };
        let lk = self.column_index(key).ok_or_else(|| missing("left"))?;
        let rk = other.column_index(key).ok_or_else(|| missing("right"))?;

        for (j, name) in other.columns.iter().enumerate() {
            if j == rk {
                continue;
            }
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|row| {
                    let k = row[lk]?;
                    other
                        .rows
                        .iter()
                        .find(|r| r[rk] == Some(k))
                        .and_then(|r| r[j])
                })
                .collect();
            self.append_column(name.clone(), &values)?;
        }
        Ok(())
    }

    /// Append one constant column per parameter, in name order.
    pub fn echo_params(&mut self, params: &Params) -> ResultsResult<()> {
        for (name, value) in params.iter() {
            let col = vec![Some(value); self.rows.len()];
            self.append_column(format!("param_{name}"), &col)?;
        }
        Ok(())
    }

    /// Header row plus one line per row; absent cells are empty.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| csv_field(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in &self.rows {
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                if let Some(v) = cell {
                    let _ = write!(out, "{v}");
                }
            }
            out.push('\n');
        }
        out
    }

    /// Parse text written by [`Table::to_csv`].
    pub fn from_csv(text: &str) -> ResultsResult<Self> {
        let mut lines = text.lines().enumerate();
        let (_, header) = lines.next().ok_or(ResultsError::Csv {
            line: 1,
            what: "missing header".to_string(),
        })?;
        let mut table = Table::new(split_header(header));
        for (i, line) in lines {
            if line.is_empty() {
                continue;
            }
            let row = line
                .split(',')
                .map(|cell| {
                    if cell.is_empty() {
                        Ok(None)
                    } else {
                        cell.parse::<f64>().map(Some).map_err(|e| ResultsError::Csv {
                            line: i + 1,
                            what: format!("'{cell}': {e}"),
                        })
                    }
                })
                .collect::<ResultsResult<Vec<_>>>()?;
            table.push_row(row).map_err(|e| ResultsError::Csv {
                line: i + 1,
                what: e.to_string(),
            })?;
        }
        Ok(table)
    }
}

fn csv_field(name: &str) -> String {
    if name.contains([',', '"', '\n']) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

fn split_header(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// One row per recorded state: time, state variables, indicators, parameters.
pub fn trajectory_table(
    traj: &Trajectory<f64>,
    indicators: &[Column],
    params: &Params,
) -> ResultsResult<Table> {
    let mut columns = vec![TIME.to_string()];
    columns.extend(traj.variables().iter().cloned());
    let mut table = Table::new(columns);
    for (t, state) in traj.iter() {
        let mut row = Vec::with_capacity(state.len() + 1);
        row.push(Some(t));
        row.extend(state.iter().map(|&v| Some(v)));
        table.push_row(row)?;
    }
    for (name, values) in indicators {
        table.append_column(name.clone(), values)?;
    }
    table.echo_params(params)?;
    Ok(table)
}

/// Scalar closed-form value over a time grid, ready to join on `time`.
pub fn theory_table(times: &[f64], value: f64) -> Table {
    Table {
        columns: vec![TIME.to_string(), "theory".to_string()],
        rows: times.iter().map(|&t| vec![Some(t), Some(value)]).collect(),
    }
}

/// One row per time index: `<var>_mean` and `<var>_std` for every variable,
/// then the joined theory columns, indicators and parameters.
pub fn ensemble_table(
    summary: &EnsembleSummary,
    theory: Option<&Table>,
    indicators: &[Column],
    params: &Params,
) -> ResultsResult<Table> {
    let mut table = Table::new(vec![TIME.to_string()]);
    for &t in summary.times() {
        table.push_row(vec![Some(t)])?;
    }
    for var in summary.variables() {
        let mean: Vec<Option<f64>> = summary.mean(var)?.into_iter().map(Some).collect();
        table.append_column(format!("{var}_mean"), &mean)?;
        table.append_column(format!("{var}_std"), &summary.std(var)?)?;
    }
    if let Some(theory) = theory {
        table.left_join(theory, TIME)?;
    }
    for (name, values) in indicators {
        table.append_column(name.clone(), values)?;
    }
    table.echo_params(params)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_core::{StateLayout, TrajectoryRecorder};

    fn two_var() -> Trajectory<f64> {
        let mut rec = TrajectoryRecorder::with_capacity(StateLayout::new(["n", "m"]).unwrap(), 3);
        rec.push(0.0, &[1.0, 2.0]);
        rec.push(1.0, &[1.5, 2.5]);
        rec.push(2.0, &[2.0, 3.0]);
        rec.finish()
    }

    #[test]
    fn column_order_is_stable() {
        let params = Params::new().with("r", 0.5).with("K", 1.0);
        let ind = vec![("n_variance".to_string(), vec![None, Some(0.125), Some(0.125)])];
        let table = trajectory_table(&two_var(), &ind, &params).unwrap();
        assert_eq!(
            table.columns,
            vec!["time", "n", "m", "n_variance", "param_K", "param_r"]
        );
        assert_eq!(
            table.rows[1],
            vec![Some(1.0), Some(1.5), Some(2.5), Some(0.125), Some(1.0), Some(0.5)]
        );
    }

    #[test]
    fn csv_has_header_and_empty_absent_cells() {
        let ind = vec![("n_acf1".to_string(), vec![None, None, Some(-0.5)])];
        let table = trajectory_table(&two_var(), &ind, &Params::new()).unwrap();
        let csv = table.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time,n,m,n_acf1"));
        assert_eq!(lines.next(), Some("0,1,2,"));
        assert_eq!(lines.nth(1), Some("2,2,3,-0.5"));
        assert_eq!(Table::from_csv(&csv).unwrap(), table);
    }

    #[test]
    fn left_join_matches_on_time() {
        let mut left = Table::new(vec!["time".into(), "x".into()]);
        for t in 0..3 {
            left.push_row(vec![Some(t as f64), Some(10.0 * t as f64)]).unwrap();
        }
        let right = Table {
            columns: vec!["theory".into(), "time".into()],
            rows: vec![vec![Some(7.0), Some(2.0)], vec![Some(5.0), Some(0.0)]],
        };
        left.left_join(&right, "time").unwrap();
        assert_eq!(left.column("theory").unwrap(), vec![Some(5.0), None, Some(7.0)]);
    }

    #[test]
    fn shape_errors() {
        let mut t = Table::new(vec!["time".into()]);
        assert!(t.push_row(vec![Some(0.0), Some(1.0)]).is_err());
        t.push_row(vec![Some(0.0)]).unwrap();
        assert!(t.append_column("x", &[]).is_err());
        assert!(t.append_column("time", &[None]).is_err());
        assert!(t.left_join(&Table::new(vec!["t".into()]), "time").is_err());
    }

    #[test]
    fn quoted_header_roundtrip() {
        let mut t = Table::new(vec!["time".into(), "a,b".into()]);
        t.push_row(vec![Some(0.0), None]).unwrap();
        assert_eq!(Table::from_csv(&t.to_csv()).unwrap(), t);
    }
}
