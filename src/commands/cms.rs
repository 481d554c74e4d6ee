// src/commands/cms.rs

use std::path::Path;

use tracing::{info, warn};

use crate::commands::{render_context, root_name};
use crate::config::Settings;
use crate::data_analysis::reference_compare::{add_difference_columns, align_to_grid};
use crate::data_input::csv_loader::{load_directory, load_reference_file};
use crate::data_input::time_series::TimeSeriesFrame;
use crate::error::TelemetryResult;
use crate::plot_functions::plot_reference_comparison::{
    plot_reference_comparison, ComparisonColumns,
};
use crate::types::PlotResult;

fn comparison_columns(settings: &Settings) -> ComparisonColumns<'_> {
    ComparisonColumns {
        meter_power: &settings.reference.meter_power_column,
        reference_power: &settings.reference.reference_power_column,
    }
}

/// Loads both datasets, aligns them on the common grid and adds the difference columns.
/// A missing power column only skips the differences.
pub fn prepare(
    data_dir: &Path,
    reference_file: &Path,
    settings: &Settings,
) -> TelemetryResult<(TimeSeriesFrame, TimeSeriesFrame)> {
    let meter = load_directory(data_dir, &settings.input.time_column)?;
    let reference = load_reference_file(reference_file, &settings.input.reference_time_column)?;

    info!("Aligning datasets...");
    let (mut meter, mut reference) = align_to_grid(&meter, &reference, settings.align_step())?;

    info!("Calculating differences...");
    let columns = comparison_columns(settings);
    if let Err(e) = add_difference_columns(
        &mut meter,
        &mut reference,
        columns.meter_power,
        columns.reference_power,
    ) {
        warn!("Skipping difference columns: {}", e);
    }
    Ok((meter, reference))
}

/// Cross-checks the meter's total active power against the CMS site power on a common
/// one-minute grid.
pub fn run(data_dir: &Path, reference_file: &Path, settings: &Settings) -> PlotResult {
    let (meter, reference) = prepare(data_dir, reference_file, settings)?;

    info!("Creating plots...");
    let ctx = render_context(settings, root_name(data_dir));
    let written =
        plot_reference_comparison(&meter, &reference, comparison_columns(settings), &ctx);
    info!("Wrote {} chart(s) to {}", written.len(), settings.output.directory.display());
    Ok(())
}
