// src/data_analysis/reference_compare.rs

use chrono::{Duration, NaiveDateTime};
use ndarray::Zip;
use tracing::{info, warn};

use crate::constants::{COL_DIFF, COL_DIFF_PERCENTAGE, PERCENTAGE_CLIP_MAX, PERCENTAGE_CLIP_MIN};
use crate::data_input::time_series::TimeSeriesFrame;
use crate::error::{TelemetryError, TelemetryResult};

/// Regular grid covering the time span both datasets share: from the later start to the
/// earlier end in `step` increments. The start is used as-is, not rounded to the step.
pub fn common_time_grid(
    meter: &TimeSeriesFrame,
    reference: &TimeSeriesFrame,
    step: Duration,
) -> TelemetryResult<Vec<NaiveDateTime>> {
    if step <= Duration::zero() {
        return Err(TelemetryError::Config {
            field: "reference.align_step_seconds".to_string(),
            message: "must be > 0".to_string(),
        });
    }
    let (meter_start, meter_end) = meter
        .time_bounds()
        .ok_or_else(|| TelemetryError::EmptyFrame(meter.name().to_string()))?;
    let (ref_start, ref_end) = reference
        .time_bounds()
        .ok_or_else(|| TelemetryError::EmptyFrame(reference.name().to_string()))?;

    let start = meter_start.max(ref_start);
    let end = meter_end.min(ref_end);
    if start > end {
        return Err(TelemetryError::NoOverlap);
    }

    let mut grid = Vec::new();
    let mut ts = start;
    while ts <= end {
        grid.push(ts);
        match ts.checked_add_signed(step) {
            Some(next) => ts = next,
            None => break,
        }
    }
    Ok(grid)
}

/// Reindexes both datasets onto their common grid.
pub fn align_to_grid(
    meter: &TimeSeriesFrame,
    reference: &TimeSeriesFrame,
    step: Duration,
) -> TelemetryResult<(TimeSeriesFrame, TimeSeriesFrame)> {
    let grid = common_time_grid(meter, reference, step)?;
    for frame in [meter, reference] {
        let dupes = frame.duplicate_timestamps();
        if dupes > 0 {
            warn!("{} has {} duplicated timestamp(s); using the first row of each", frame.name(), dupes);
        }
    }
    info!(
        "Aligned on {} grid points from {} to {}",
        grid.len(),
        grid[0],
        grid[grid.len() - 1]
    );
    Ok((meter.reindex(&grid), reference.reindex(&grid)))
}

/// Relative error in percent, limited to `[0, 100]`. NaN stays NaN.
pub fn clipped_percentage(diff: f64, reference: f64) -> f64 {
    (diff / reference * 100.0).clamp(PERCENTAGE_CLIP_MIN, PERCENTAGE_CLIP_MAX)
}

/// Adds `diff` (meter minus reference) to the meter frame and the clipped percentage
/// difference to both frames. Both frames must already share one index.
pub fn add_difference_columns(
    meter: &mut TimeSeriesFrame,
    reference: &mut TimeSeriesFrame,
    meter_column: &str,
    reference_column: &str,
) -> TelemetryResult<()> {
    let meter_power = meter.require(meter_column)?;
    let reference_power = reference.require(reference_column)?;
    if meter_power.len() != reference_power.len() {
        return Err(TelemetryError::LengthMismatch {
            column: reference_column.to_string(),
            expected: meter_power.len(),
            actual: reference_power.len(),
        });
    }

    let diff = meter_power - reference_power;
    let percentage = Zip::from(&diff)
        .and(reference_power)
        .map_collect(|&d, &r| clipped_percentage(d, r));

    meter.insert_column(COL_DIFF, diff)?;
    meter.insert_column(COL_DIFF_PERCENTAGE, percentage.clone())?;
    reference.insert_column(COL_DIFF_PERCENTAGE, percentage)?;
    Ok(())
}

/// Per-charger columns of the reference export: everything except the derived percentage.
pub fn charger_columns(reference: &TimeSeriesFrame) -> Vec<String> {
    reference
        .column_names()
        .iter()
        .filter(|c| c.as_str() != COL_DIFF_PERCENTAGE)
        .cloned()
        .collect()
}
