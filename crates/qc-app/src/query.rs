//! Query helpers for extracting data from loaded runs.

use qc_results::Table;

use crate::error::{AppError, AppResult};

/// Summary of a stored table's time range and shape.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub row_count: usize,
    pub columns: Vec<String>,
}

pub fn get_run_summary(table: &Table) -> AppResult<RunSummary> {
    let times = table
        .column("time")
        .ok_or_else(|| AppError::InvalidInput("Table has no time column".to_string()))?;
    let mut defined = times.into_iter().flatten();
    let Some(t_min) = defined.next() else {
        return Err(AppError::InvalidInput("No rows in table".to_string()));
    };
    let t_max = defined.last().unwrap_or(t_min);

    Ok(RunSummary {
        time_range: (t_min, t_max),
        row_count: table.len(),
        columns: table.columns.clone(),
    })
}

/// `(time, value)` pairs for the defined cells of `column`.
pub fn extract_series(table: &Table, column: &str) -> AppResult<Vec<(f64, f64)>> {
    let t = table
        .column_index("time")
        .ok_or_else(|| AppError::InvalidInput("Table has no time column".to_string()))?;
    let j = table
        .column_index(column)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown column: {}", column)))?;

    Ok(table
        .rows
        .iter()
        .filter_map(|row| Some((row[t]?, row[j]?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            columns: vec!["time".into(), "x".into(), "x_variance".into()],
            rows: vec![
                vec![Some(0.0), Some(1.0), None],
                vec![Some(1.0), Some(2.0), Some(0.5)],
                vec![Some(2.0), Some(4.0), Some(2.0)],
            ],
        }
    }

    #[test]
    fn summary_and_series() {
        let t = table();
        let s = get_run_summary(&t).unwrap();
        assert_eq!(s.time_range, (0.0, 2.0));
        assert_eq!(s.row_count, 3);
        assert_eq!(
            extract_series(&t, "x_variance").unwrap(),
            vec![(1.0, 0.5), (2.0, 2.0)]
        );
        assert!(extract_series(&t, "y").is_err());
    }

    #[test]
    fn empty_table_has_no_summary() {
        let t = Table::new(vec!["time".into()]);
        assert!(matches!(get_run_summary(&t), Err(AppError::InvalidInput(_))));
    }
}
