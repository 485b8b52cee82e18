//! Monotone trend of an indicator series.

/// Kendall's tau-b between position and value over the defined entries.
///
/// Absent entries are skipped; positions keep their original index. Returns
/// `None` with fewer than two defined entries or when every value ties.
pub fn kendall_tau(series: &[Option<f64>]) -> Option<f64> {
    let points: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| !v.is_nan()).map(|v| (i, v)))
        .collect();
    let n = points.len();
    if n < 2 {
        return None;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut value_ties = 0i64;
    for (a, &(_, va)) in points.iter().enumerate() {
        for &(_, vb) in &points[a + 1..] {
            // Positions are strictly increasing, so only the value decides.
            if vb > va {
                concordant += 1;
            } else if vb < va {
                discordant += 1;
            } else {
                value_ties += 1;
            }
        }
    }

    let pairs = (n * (n - 1) / 2) as i64;
    let denom = ((pairs as f64) * ((pairs - value_ties) as f64)).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((concordant - discordant) as f64 / denom)
}
