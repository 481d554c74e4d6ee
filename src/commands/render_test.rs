// src/commands/render_test.rs

use chrono::{Duration, Local};
use tracing::info;

use crate::commands::render_context;
use crate::config::Settings;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_functions::time_series_chart::{render_stacked_chart, PanelSpec, StackedChart};
use crate::types::PlotResult;

/// Renders a three-point chart to confirm fonts and the bitmap backend work on this machine.
pub fn run(settings: &Settings) -> PlotResult {
    let start = Local::now().naive_local();
    let index = (0..3).map(|i| start + Duration::minutes(i)).collect();
    let frame = TimeSeriesFrame::with_columns(
        "render test",
        index,
        vec![("y".to_string(), vec![1.0, 4.0, 9.0])],
    )?;
    let chart = StackedChart::new(
        "RenderTest",
        vec![PanelSpec::new("Render Test", "Value").columns(&frame, ["y"])],
    );
    let path = render_stacked_chart(&chart, &render_context(settings, "pq_csv_render".to_string()))?;
    info!("Rendering works: wrote '{}'", path.display());
    Ok(())
}
