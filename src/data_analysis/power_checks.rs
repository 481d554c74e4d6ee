// src/data_analysis/power_checks.rs

use chrono::NaiveDateTime;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use tracing::warn;

use crate::constants::{COL_CHECK_PQS, COL_DIFF_PQS, COL_SSUM_CAL};
use crate::data_input::time_series::TimeSeriesFrame;
use crate::error::TelemetryResult;

/// Magnitude of the complex power built from active and reactive components: sqrt(P^2 + Q^2).
pub fn apparent_power_from_pq(
    frame: &TimeSeriesFrame,
    p_column: &str,
    q_column: &str,
) -> TelemetryResult<Array1<f64>> {
    let p = frame.require(p_column)?;
    let q = frame.require(q_column)?;
    Ok((p.mapv(|v| v * v) + q.mapv(|v| v * v)).mapv(f64::sqrt))
}

/// Measured apparent power minus the apparent power implied by P and Q.
pub fn apparent_power_residual(
    frame: &TimeSeriesFrame,
    s_column: &str,
    p_column: &str,
    q_column: &str,
) -> TelemetryResult<Array1<f64>> {
    let s = frame.require(s_column)?;
    let computed = apparent_power_from_pq(frame, p_column, q_column)?;
    Ok(s - &computed)
}

/// 1.0 where the residual is within tolerance, 0.0 otherwise. NaN residuals fail.
pub fn tolerance_flags(residual: &Array1<f64>, tolerance: f64) -> Array1<f64> {
    residual.mapv(|v| if v <= tolerance { 1.0 } else { 0.0 })
}

/// Minimum of a column and the timestamp where it first occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExtreme {
    pub column: String,
    pub value: f64,
    pub timestamp: NaiveDateTime,
}

/// NaN-skipping minimum of `column`. `Ok(None)` when the column holds no numbers.
pub fn find_min_value(
    frame: &TimeSeriesFrame,
    column: &str,
) -> TelemetryResult<Option<ColumnExtreme>> {
    let data = frame.require(column)?;
    let Ok(pos) = data.argmin_skipnan() else {
        return Ok(None);
    };
    Ok(Some(ColumnExtreme {
        column: column.to_string(),
        value: data[pos],
        timestamp: frame.index()[pos],
    }))
}

/// Outcome of [`add_check_columns`].
#[derive(Debug, Default, Clone)]
pub struct CheckSummary {
    /// Derived columns that were added to the frame.
    pub added: Vec<&'static str>,
    /// Derived columns that could not be computed, with the reason.
    pub skipped: Vec<(&'static str, String)>,
    /// Rows within tolerance, out of rows with a finite residual.
    pub rows_within_tolerance: usize,
    pub rows_checked: usize,
}

/// Adds the phase-1 apparent-power residual (`diff_pqs`), its tolerance flag (`check_pqs`)
/// and the apparent power recomputed from the totals (`Ssum_cal`).
pub fn add_check_columns(frame: &mut TimeSeriesFrame, tolerance: f64) -> CheckSummary {
    let mut summary = CheckSummary::default();

    match apparent_power_residual(frame, "S1", "P1", "Q1") {
        Ok(residual) => {
            let flags = tolerance_flags(&residual, tolerance);
            summary.rows_checked = residual.iter().filter(|v| v.is_finite()).count();
            summary.rows_within_tolerance = flags.iter().filter(|&&f| f == 1.0).count();
            // Both arrays come from the frame's own columns, so lengths always match.
            if frame.insert_column(COL_DIFF_PQS, residual).is_ok() {
                summary.added.push(COL_DIFF_PQS);
            }
            if frame.insert_column(COL_CHECK_PQS, flags).is_ok() {
                summary.added.push(COL_CHECK_PQS);
            }
        }
        Err(e) => {
            warn!("Skipping {} and {}: {}", COL_DIFF_PQS, COL_CHECK_PQS, e);
            summary.skipped.push((COL_DIFF_PQS, e.to_string()));
            summary.skipped.push((COL_CHECK_PQS, e.to_string()));
        }
    }

    match apparent_power_from_pq(frame, "Psum_kW", "Qsum_kvar") {
        Ok(s_calc) => {
            if frame.insert_column(COL_SSUM_CAL, s_calc).is_ok() {
                summary.added.push(COL_SSUM_CAL);
            }
        }
        Err(e) => {
            warn!("Skipping {}: {}", COL_SSUM_CAL, e);
            summary.skipped.push((COL_SSUM_CAL, e.to_string()));
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(columns: Vec<(&str, Vec<f64>)>) -> TimeSeriesFrame {
        let rows = columns[0].1.len();
        let index = (0..rows as u32)
            .map(|m| {
                NaiveDate::from_ymd_opt(2024, 12, 9)
                    .unwrap()
                    .and_hms_opt(10, m, 0)
                    .unwrap()
            })
            .collect();
        TimeSeriesFrame::with_columns(
            "meter",
            index,
            columns
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_apparent_power_from_pq() {
        let f = frame(vec![("P", vec![3.0, 0.0]), ("Q", vec![4.0, -2.0])]);
        let s = apparent_power_from_pq(&f, "P", "Q").unwrap();
        assert_eq!(s.to_vec(), vec![5.0, 2.0]);
    }

    #[test]
    fn test_residual_and_flags() {
        let f = frame(vec![
            ("S1", vec![5.0, 7.0, f64::NAN]),
            ("P1", vec![3.0, 3.0, 3.0]),
            ("Q1", vec![4.0, 4.0, 4.0]),
        ]);
        let residual = apparent_power_residual(&f, "S1", "P1", "Q1").unwrap();
        assert_eq!(residual[0], 0.0);
        assert_eq!(residual[1], 2.0);
        assert!(residual[2].is_nan());
        let flags = tolerance_flags(&residual, 1.0);
        assert_eq!(flags.to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_negative_residual_passes() {
        // Only an excess of measured S over sqrt(P^2 + Q^2) is flagged.
        let residual = Array1::from(vec![-50.0, 1.0, 1.0001]);
        assert_eq!(tolerance_flags(&residual, 1.0).to_vec(), vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_find_min_value_skips_nan() {
        let f = frame(vec![("diff_pqs", vec![f64::NAN, -0.5, 2.0, -0.5])]);
        let min = find_min_value(&f, "diff_pqs").unwrap().unwrap();
        assert_eq!(min.value, -0.5);
        assert_eq!(min.timestamp, f.index()[1]);

        let empty = frame(vec![("diff_pqs", vec![f64::NAN, f64::NAN])]);
        assert_eq!(find_min_value(&empty, "diff_pqs").unwrap(), None);
        assert!(find_min_value(&f, "missing").is_err());
    }

    #[test]
    fn test_add_check_columns_partial_inputs() {
        let mut f = frame(vec![
            ("S1", vec![5.0, 9.0]),
            ("P1", vec![3.0, 3.0]),
            ("Q1", vec![4.0, 4.0]),
        ]);
        let summary = add_check_columns(&mut f, 1.0);
        assert_eq!(summary.added, vec![COL_DIFF_PQS, COL_CHECK_PQS]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, COL_SSUM_CAL);
        assert_eq!(summary.rows_checked, 2);
        assert_eq!(summary.rows_within_tolerance, 1);
        assert_eq!(f.column(COL_CHECK_PQS).unwrap().to_vec(), vec![1.0, 0.0]);
    }
}
