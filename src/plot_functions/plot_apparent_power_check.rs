// src/plot_functions/plot_apparent_power_check.rs

use std::path::PathBuf;

use crate::constants::{COL_DIFF_PQS, COL_SSUM_CAL};
use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::plot_phase_quantities::PHASE_POWER_COLUMNS;
use crate::plot_functions::time_series_chart::{render_all, PanelSpec, RenderContext, StackedChart};

/// Residual of the phase-1 apparent power check next to the per-phase powers, and measured
/// total apparent power against the value recomputed from P and Q, next to average THD.
pub fn apparent_power_check_charts(frame: &TimeSeriesFrame) -> Vec<StackedChart<'_>> {
    vec![
        StackedChart::new(
            "ApparentPowerCheck",
            vec![
                PanelSpec::new("Difference between S1 and √(P1² + Q1²)", "kVA")
                    .columns(frame, [COL_DIFF_PQS]),
                PanelSpec::new("Phase Power Values (P1, P2, P3, Q1, Q2, Q3)", "Power")
                    .columns(frame, PHASE_POWER_COLUMNS),
            ],
        ),
        StackedChart::new(
            "MeasuredVsCalculatedS",
            vec![
                PanelSpec::new("Measured vs. Calculated S", "kVA")
                    .columns(frame, ["Ssum_kVA", COL_SSUM_CAL]),
                PanelSpec::new("THD Values", "Percentage").columns(frame, ["THD_Vavg", "THD_Iavg"]),
            ],
        ),
    ]
}

pub fn plot_apparent_power_check(frame: &TimeSeriesFrame, ctx: &RenderContext) -> Vec<PathBuf> {
    render_all(&apparent_power_check_charts(frame), ctx)
}
