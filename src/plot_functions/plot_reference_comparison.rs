// src/plot_functions/plot_reference_comparison.rs

use std::path::PathBuf;

use crate::constants::{COL_DIFF, COL_DIFF_PERCENTAGE};
use crate::data_analysis::reference_compare::charger_columns;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::time_series_chart::{render_all, PanelSpec, RenderContext, StackedChart};

/// Column names used by the meter/reference comparison charts.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonColumns<'a> {
    pub meter_power: &'a str,
    pub reference_power: &'a str,
}

/// Top panel shared by both comparison charts: meter power, the difference, and the
/// reference site power.
fn meter_vs_reference_panel<'f>(
    meter: &'f TimeSeriesFrame,
    reference: &'f TimeSeriesFrame,
    columns: ComparisonColumns,
) -> PanelSpec<'f> {
    PanelSpec::new("Power Meter vs. CMS Site Power", "kW")
        .columns(meter, [columns.meter_power, COL_DIFF])
        .columns(reference, [columns.reference_power])
}

/// Meter vs CMS charts. Both frames must already be aligned on the same grid.
pub fn reference_comparison_charts<'f>(
    meter: &'f TimeSeriesFrame,
    reference: &'f TimeSeriesFrame,
    columns: ComparisonColumns,
) -> Vec<StackedChart<'f>> {
    // The site power already sits in the top panel.
    let chargers: Vec<String> = charger_columns(reference)
        .into_iter()
        .filter(|c| c != columns.reference_power)
        .collect();

    vec![
        StackedChart::new(
            "MeterVsCmsChargers",
            vec![
                meter_vs_reference_panel(meter, reference, columns),
                PanelSpec::new("Individual Charger Power", "kW").columns(reference, chargers),
            ],
        ),
        StackedChart::new(
            "MeterVsCmsPercentage",
            vec![
                meter_vs_reference_panel(meter, reference, columns),
                PanelSpec::new("Percentage Difference", "%").columns(reference, [COL_DIFF_PERCENTAGE]),
            ],
        ),
    ]
}

pub fn plot_reference_comparison(
    meter: &TimeSeriesFrame,
    reference: &TimeSeriesFrame,
    columns: ComparisonColumns,
    ctx: &RenderContext,
) -> Vec<PathBuf> {
    render_all(&reference_comparison_charts(meter, reference, columns), ctx)
}
