// src/plot_functions/time_series_chart.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::color_map::ColorMap;
use crate::constants::LINE_WIDTH_PLOT;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::plot_framework::{calculate_range, data_bounds, draw_stacked_plot, PlotConfig, PlotSeries};
use crate::types::PlotResult;

/// Where and how charts are written.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub output_dir: PathBuf,
    /// Prefix of every output file and the heading drawn on each image.
    pub root_name: String,
    pub plot_size: (u32, u32),
    pub colors: ColorMap,
}

impl RenderContext {
    pub fn output_path(&self, file_stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.png", self.root_name, file_stem))
    }
}

/// One column of one dataset plotted as a line.
#[derive(Debug, Clone)]
pub struct ColumnRef<'f> {
    pub frame: &'f TimeSeriesFrame,
    pub column: String,
}

/// A panel of a stacked chart.
#[derive(Debug, Clone)]
pub struct PanelSpec<'f> {
    pub title: String,
    pub y_label: String,
    pub x_label: String,
    pub series: Vec<ColumnRef<'f>>,
}

impl<'f> PanelSpec<'f> {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            x_label: "Time".to_string(),
            series: Vec::new(),
        }
    }

    pub fn x_label(mut self, x_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self
    }

    /// Adds `columns` of `frame`, in order.
    pub fn columns<S: Into<String>>(
        mut self,
        frame: &'f TimeSeriesFrame,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.series.extend(columns.into_iter().map(|column| ColumnRef {
            frame,
            column: column.into(),
        }));
        self
    }

    /// Plot series for every column that exists, colored through `colors`. Missing columns
    /// are logged and left out; columns holding only NaN come back with no runs.
    pub fn plot_series(&self, colors: &ColorMap) -> Vec<PlotSeries> {
        let mut cycle_slot = 0;
        let mut out = Vec::with_capacity(self.series.len());
        for column_ref in &self.series {
            let Some(runs) = column_ref.frame.series_runs(&column_ref.column) else {
                warn!(
                    "Column '{}' not found in {}; left out of '{}'",
                    column_ref.column,
                    column_ref.frame.name(),
                    self.title
                );
                continue;
            };
            let color = colors.color_for(&column_ref.column, &mut cycle_slot);
            out.push(PlotSeries {
                runs,
                label: column_ref.column.clone(),
                color,
                stroke_width: LINE_WIDTH_PLOT,
            });
        }
        out
    }
}

/// A multi-panel chart sharing one time axis.
#[derive(Debug, Clone)]
pub struct StackedChart<'f> {
    /// File name suffix, e.g. `CurrentMagnitudeAngle`.
    pub file_stem: String,
    pub panels: Vec<PanelSpec<'f>>,
}

impl<'f> StackedChart<'f> {
    pub fn new(file_stem: impl Into<String>, panels: Vec<PanelSpec<'f>>) -> Self {
        Self {
            file_stem: file_stem.into(),
            panels,
        }
    }

    /// Resolves every panel into a [`PlotConfig`]. All panels share the x range spanning
    /// every panel's data. Panels none of whose columns exist are `None`; panels whose
    /// columns exist but hold no samples get a config without data.
    pub fn plot_configs(&self, colors: &ColorMap) -> Vec<Option<PlotConfig>> {
        let panel_series: Vec<Vec<PlotSeries>> =
            self.panels.iter().map(|p| p.plot_series(colors)).collect();

        let shared_x = data_bounds(panel_series.iter().flatten().flat_map(|s| &s.runs))
            .map(|(x, _)| x);

        self.panels
            .iter()
            .zip(panel_series)
            .map(|(panel, series)| {
                if series.is_empty() {
                    return None;
                }
                let bounds = data_bounds(series.iter().flat_map(|s| &s.runs));
                let (x_range, y_range) = match (shared_x.clone(), bounds) {
                    (Some(x_range), Some((_, (y_min, y_max)))) => {
                        let (y_lo, y_hi) = calculate_range(y_min, y_max);
                        (x_range, y_lo..y_hi)
                    }
                    _ => (0.0..0.0, 0.0..0.0),
                };
                Some(PlotConfig {
                    title: panel.title.clone(),
                    x_range,
                    y_range,
                    series,
                    x_label: panel.x_label.clone(),
                    y_label: panel.y_label.clone(),
                })
            })
            .collect()
    }
}

/// Renders `chart` to `<output_dir>/<root_name>_<file_stem>.png` and returns the path.
pub fn render_stacked_chart(chart: &StackedChart, ctx: &RenderContext) -> PlotResult<PathBuf> {
    ensure_output_dir(&ctx.output_dir)?;
    let output_path = ctx.output_path(&chart.file_stem);
    let titles: Vec<&str> = chart.panels.iter().map(|p| p.title.as_str()).collect();
    let mut configs = chart.plot_configs(&ctx.colors);
    debug!("Rendering '{}' with {} panel(s)", chart.file_stem, configs.len());

    draw_stacked_plot(
        &output_path,
        ctx.plot_size,
        &ctx.root_name,
        &titles,
        |panel_index| configs.get_mut(panel_index).and_then(Option::take),
    )?;
    Ok(output_path)
}

/// Renders several charts, continuing past failures. Returns the files written.
pub fn render_all(charts: &[StackedChart], ctx: &RenderContext) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for chart in charts {
        match render_stacked_chart(chart, ctx) {
            Ok(path) => written.push(path),
            Err(e) => warn!("Failed to render '{}': {}", chart.file_stem, e),
        }
    }
    written
}

fn ensure_output_dir(dir: &Path) -> PlotResult {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame(name: &str, minutes: &[u32], columns: Vec<(&str, Vec<f64>)>) -> TimeSeriesFrame {
        let index = minutes
            .iter()
            .map(|&m| {
                NaiveDate::from_ymd_opt(2024, 12, 9)
                    .unwrap()
                    .and_hms_opt(10, m, 0)
                    .unwrap()
            })
            .collect();
        TimeSeriesFrame::with_columns(
            name,
            index,
            columns.into_iter().map(|(n, v)| (n.to_string(), v)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_columns_are_left_out() {
        let f = frame("meter", &[0, 1], vec![("I1", vec![1.0, 2.0])]);
        let panel = PanelSpec::new("Current", "Amps").columns(&f, ["I1", "I2"]);
        let series = panel.plot_series(&ColorMap::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "I1");
    }

    #[test]
    fn test_panels_share_x_range() {
        let meter = frame("meter", &[0, 5], vec![("Psum_kW", vec![1.0, 2.0])]);
        let cms = frame("cms", &[2, 9], vec![("charger_1", vec![0.0, 4.0])]);
        let chart = StackedChart::new(
            "Test",
            vec![
                PanelSpec::new("Meter", "kW").columns(&meter, ["Psum_kW"]),
                PanelSpec::new("Chargers", "kW").columns(&cms, ["charger_1"]),
                PanelSpec::new("Empty", "kW").columns(&cms, ["nope"]),
            ],
        );
        let configs = chart.plot_configs(&ColorMap::default());
        let top = configs[0].as_ref().unwrap();
        let bottom = configs[1].as_ref().unwrap();
        assert_eq!(top.x_range, bottom.x_range);
        assert_eq!(top.x_range.end - top.x_range.start, 540.0);
        assert_eq!(top.y_range, 0.85..2.15);
        assert!(configs[2].is_none());
    }

    #[test]
    fn test_all_nan_panel_has_config_without_data() {
        let meter = frame(
            "meter",
            &[0, 1, 2],
            vec![("Psum_kW", vec![1.0, f64::NAN, 3.0]), ("THD_Vavg", vec![f64::NAN; 3])],
        );
        let chart = StackedChart::new(
            "Test",
            vec![
                PanelSpec::new("Power", "kW").columns(&meter, ["Psum_kW"]),
                PanelSpec::new("THD", "Percentage").columns(&meter, ["THD_Vavg"]),
            ],
        );
        let configs = chart.plot_configs(&ColorMap::default());
        let power = configs[0].as_ref().unwrap();
        assert!(power.has_data());
        assert_eq!(power.series[0].runs.len(), 2);
        let thd = configs[1].as_ref().unwrap();
        assert!(!thd.has_data());
        assert_eq!(thd.series[0].label, "THD_Vavg");
    }

    #[test]
    fn test_output_path() {
        let ctx = RenderContext {
            output_dir: PathBuf::from("out"),
            root_name: "site_a".to_string(),
            plot_size: (1400, 800),
            colors: ColorMap::default(),
        };
        assert_eq!(
            ctx.output_path("PowerAndPowerFactor"),
            PathBuf::from("out/site_a_PowerAndPowerFactor.png")
        );
    }
}
