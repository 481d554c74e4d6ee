// src/commands/process.rs

use std::io;
use std::path::Path;

use tracing::info;

use crate::commands::{render_context, root_name};
use crate::config::Settings;
use crate::data_analysis::consumption::{
    calculate_consumption, energy_columns, print_consumption, Period,
};
use crate::data_input::csv_loader::load_directory;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::plot_consumption::consumption_chart;
use crate::plot_functions::plot_phase_quantities::phase_quantity_charts;
use crate::plot_functions::time_series_chart::{render_all, StackedChart};
use crate::types::PlotResult;

/// Every chart of the process run. `consumption` holds the daily and weekly tables as
/// frames when the data has energy registers.
pub fn process_charts<'f>(
    all_data: &'f TimeSeriesFrame,
    consumption: Option<(&'f TimeSeriesFrame, &'f TimeSeriesFrame)>,
) -> Vec<StackedChart<'f>> {
    let mut charts = phase_quantity_charts(all_data);
    if let Some((daily, weekly)) = consumption {
        charts.push(consumption_chart(daily, weekly));
    }
    charts
}

/// Phase current/angle and power charts, plus daily and weekly consumption of the energy
/// registers when the data has any.
pub fn run(data_dir: &Path, settings: &Settings) -> PlotResult {
    let all_data = load_directory(data_dir, &settings.input.time_column)?;
    let ctx = render_context(settings, root_name(data_dir));

    let energy = energy_columns(&all_data);
    let consumption_frames = if energy.is_empty() {
        println!("No energy data (EP_TOTAL or EQ_TOTAL) found in the dataset.");
        None
    } else {
        info!("Calculating energy consumption...");
        let daily = calculate_consumption(&all_data, &energy, Period::Daily)?;
        let weekly = calculate_consumption(&all_data, &energy, Period::Weekly)?;

        let mut stdout = io::stdout().lock();
        print_consumption(&daily, &mut stdout)?;
        print_consumption(&weekly, &mut stdout)?;
        drop(stdout);

        if settings.output.export_consumption_csv {
            std::fs::create_dir_all(&settings.output.directory)?;
            for table in [&daily, &weekly] {
                let path = settings.output.directory.join(format!(
                    "{}_{}_consumption.csv",
                    ctx.root_name,
                    table.period.prefix().to_lowercase()
                ));
                table.export_csv(&path)?;
                info!("  Consumption table saved as '{}'.", path.display());
            }
        }
        Some((daily.to_frame(), weekly.to_frame()))
    };

    info!("Creating plots...");
    let charts = process_charts(
        &all_data,
        consumption_frames.as_ref().map(|(daily, weekly)| (daily, weekly)),
    );
    let written = render_all(&charts, &ctx);
    info!("Wrote {} chart(s) to {}", written.len(), settings.output.directory.display());
    Ok(())
}
