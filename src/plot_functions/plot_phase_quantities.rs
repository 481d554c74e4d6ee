// src/plot_functions/plot_phase_quantities.rs

use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::time_series_chart::{PanelSpec, StackedChart};

pub const CURRENT_COLUMNS: [&str; 3] = ["I1", "I2", "I3"];
pub const ANGLE_COLUMNS: [&str; 5] = ["Ang_Ia", "Ang_Ib", "Ang_Ic", "Ang_Vb", "Ang_Vc"];
pub const PHASE_POWER_COLUMNS: [&str; 6] = ["P1", "P2", "P3", "Q1", "Q2", "Q3"];

/// Per-phase current magnitude/angle and per-phase P, Q with the power factor.
pub fn phase_quantity_charts(frame: &TimeSeriesFrame) -> Vec<StackedChart<'_>> {
    vec![
        StackedChart::new(
            "CurrentMagnitudeAngle",
            vec![
                PanelSpec::new("Current Magnitude Per Phase", "Amps").columns(frame, CURRENT_COLUMNS),
                PanelSpec::new("Current Phase Angle Per Phase", "Degrees").columns(frame, ANGLE_COLUMNS),
            ],
        ),
        StackedChart::new(
            "PowerAndPowerFactor",
            vec![
                PanelSpec::new("P, Q Per Phase", "kW").columns(frame, PHASE_POWER_COLUMNS),
                PanelSpec::new("Power Factor", "p.u.").columns(frame, ["PF"]),
            ],
        ),
    ]
}
