// src/commands/check.rs

use std::path::Path;

use tracing::info;

use crate::commands::{render_context, root_name};
use crate::config::Settings;
use crate::constants::COL_DIFF_PQS;
use crate::data_analysis::power_checks::{add_check_columns, find_min_value, CheckSummary};
use crate::data_input::csv_loader::load_directory;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::error::TelemetryResult;
use crate::plot_functions::plot_apparent_power_check::plot_apparent_power_check;
use crate::types::PlotResult;

/// Loads the meter data and adds whichever check columns its inputs allow. Missing inputs
/// are logged and listed in the summary.
pub fn prepare(data_dir: &Path, settings: &Settings) -> TelemetryResult<(TimeSeriesFrame, CheckSummary)> {
    let mut all_data = load_directory(data_dir, &settings.input.time_column)?;
    let summary = add_check_columns(&mut all_data, settings.checks.apparent_power_tolerance);
    Ok((all_data, summary))
}

/// Apparent-power consistency check (S against sqrt(P^2 + Q^2)) with THD charts.
pub fn run(data_dir: &Path, settings: &Settings) -> PlotResult {
    let (all_data, summary) = prepare(data_dir, settings)?;

    if summary.added.contains(&COL_DIFF_PQS) {
        match find_min_value(&all_data, COL_DIFF_PQS)? {
            Some(min) => {
                println!("{} min value is: {}", min.column, min.value);
                println!("Index of minimum value: {}", min.timestamp);
            }
            None => println!("{COL_DIFF_PQS} has no numeric values"),
        }
        println!(
            "{} of {} rows within tolerance ({} kVA)",
            summary.rows_within_tolerance,
            summary.rows_checked,
            settings.checks.apparent_power_tolerance
        );
    }

    info!("Creating plots...");
    let ctx = render_context(settings, root_name(data_dir));
    let written = plot_apparent_power_check(&all_data, &ctx);
    info!("Wrote {} chart(s) to {}", written.len(), settings.output.directory.display());
    Ok(())
}
