// src/plot_functions/plot_consumption.rs

use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::time_series_chart::{PanelSpec, StackedChart};

/// Daily consumption (top) and weekly consumption (bottom) of every energy register.
pub fn consumption_chart<'f>(daily: &'f TimeSeriesFrame, weekly: &'f TimeSeriesFrame) -> StackedChart<'f> {
    StackedChart::new(
        "EnergyConsumption",
        vec![
            PanelSpec::new("Daily Consumption", "kWh / kvarh")
                .x_label("Date")
                .columns(daily, daily.column_names().iter().cloned()),
            PanelSpec::new("Weekly Consumption (week ending Sunday)", "kWh / kvarh")
                .x_label("Week")
                .columns(weekly, weekly.column_names().iter().cloned()),
        ],
    )
}
