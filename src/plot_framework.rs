// src/plot_framework.rs

use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Text};
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::ops::Range;
use std::path::Path;

use tracing::info;

use crate::constants::{FONT_SIZE_MESSAGE, LINE_WIDTH_LEGEND};
use crate::data_input::timestamp::from_epoch_seconds;
use crate::font_config::{
    FONT_TUPLE_AXIS_LABEL, FONT_TUPLE_CHART_TITLE, FONT_TUPLE_LEGEND, FONT_TUPLE_MAIN_TITLE,
    FONT_TUPLE_MESSAGE,
};
use crate::types::{PlotResult, SeriesData};

/// Half-width of the x window drawn around a single timestamp (seconds).
const SINGLE_SAMPLE_HALF_WINDOW_S: f64 = 30.0;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Min/max over every point of every series as `(x_range, (y_min, y_max))`.
/// Returns `None` when there is no finite point at all.
pub fn data_bounds<'s>(series: impl IntoIterator<Item = &'s SeriesData>) -> Option<(Range<f64>, (f64, f64))> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for points in series {
        for &(x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if x_min.is_infinite() {
        return None;
    }
    Some((time_range(x_min, x_max), (y_min, y_max)))
}

/// X range for a time axis; a single timestamp gets a small window around it.
pub fn time_range(start: f64, end: f64) -> Range<f64> {
    if end > start {
        start..end
    } else {
        (start - SINGLE_SAMPLE_HALF_WINDOW_S)..(start + SINGLE_SAMPLE_HALF_WINDOW_S)
    }
}

/// Y tick label with "k"/"M" notation for large magnitudes. Power factor axes (`p.u.`)
/// keep two decimals; other small fractional values keep one.
pub fn format_y_tick(y: f64, y_label: &str) -> String {
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 10_000.0 {
        format!("{:.0}k", y / 1000.0)
    } else if y_label.contains("p.u.") {
        format!("{:.2}", y)
    } else if y.abs() < 10.0 && y.fract() != 0.0 {
        format!("{:.1}", y)
    } else {
        format!("{:.0}", y)
    }
}

/// strftime layout for time ticks, coarser as the visible span grows.
pub fn time_tick_format(span_s: f64) -> &'static str {
    const HOUR: f64 = 3600.0;
    const DAY: f64 = 24.0 * HOUR;
    if span_s <= 2.0 * HOUR {
        "%H:%M:%S"
    } else if span_s <= 3.0 * DAY {
        "%m-%d %H:%M"
    } else if span_s <= 120.0 * DAY {
        "%Y-%m-%d"
    } else {
        "%Y-%m"
    }
}

pub fn format_time_tick(x: f64, span_s: f64) -> String {
    match from_epoch_seconds(x) {
        Some(ts) => ts.format(time_tick_format(span_s)).to_string(),
        None => String::new(),
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel_title: &str,
    reason: &str,
) -> PlotResult {
    // Approximate character width relative to font size
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let heading = format!("{panel_title} Data Unavailable:");
    let lines = [heading.as_str(), reason];

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0) as i32;
    let center_x = width / 2 - max_line_length.saturating_mul(estimated_char_width) / 2;
    let mut y = height / 2 - (lines.len() as i32 * line_height) / 2;

    let text_style = FONT_TUPLE_MESSAGE.into_font().color(&RED);
    for line in lines {
        area.draw(&Text::new(line.to_string(), (center_x, y), text_style.clone()))?;
        y += line_height;
    }
    Ok(())
}

/// One legend entry. Each run is drawn as its own line, so gaps between runs stay empty.
#[derive(Clone, Debug)]
pub struct PlotSeries {
    pub runs: Vec<SeriesData>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
}

#[derive(Clone, Debug)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
}

impl PlotConfig {
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| s.runs.iter().any(|run| !run.is_empty()))
    }

    pub fn valid_ranges(&self) -> bool {
        self.x_range.end > self.x_range.start && self.y_range.end > self.y_range.start
    }
}

/// Draws one time-series panel: grid, every series as a line, legend in the upper right.
pub fn draw_time_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_config: &PlotConfig,
) -> PlotResult {
    let span = plot_config.x_range.end - plot_config.x_range.start;

    let mut chart = ChartBuilder::on(area)
        .caption(&plot_config.title, FONT_TUPLE_CHART_TITLE)
        .margin(5)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(plot_config.x_range.clone(), plot_config.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&plot_config.x_label)
        .y_desc(&plot_config.y_label)
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&|x| format_time_tick(*x, span))
        .y_label_formatter(&|y| format_y_tick(*y, &plot_config.y_label))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.05))
        .label_style(FONT_TUPLE_AXIS_LABEL)
        .draw()?;

    let mut legend_series_count = 0;
    for s in &plot_config.series {
        if s.runs.iter().all(|run| run.is_empty()) {
            continue;
        }
        let color = s.color;
        let style = color.stroke_width(s.stroke_width);
        let series = chart.draw_series(
            s.runs
                .iter()
                .filter(|run| !run.is_empty())
                .map(|run| PathElement::new(run.clone(), style)),
        )?;
        if !s.label.is_empty() {
            series.label(&s.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(FONT_TUPLE_LEGEND)
            .draw()?;
    }

    Ok(())
}

/// Creates an image with one vertically stacked panel per entry of `panel_titles`.
///
/// `get_panel_plot_data` is called once per panel index; panels it returns `None` for, or
/// whose config has no points, get a placeholder message instead of a chart.
/// Returns whether at least one panel was drawn with data.
pub fn draw_stacked_plot<'a, F>(
    output_path: &'a Path,
    plot_size: (u32, u32),
    root_name: &str,
    panel_titles: &[&str],
    mut get_panel_plot_data: F,
) -> PlotResult<bool>
where
    F: FnMut(usize) -> Option<PlotConfig>,
    <BitMapBackend<'a> as DrawingBackend>::ErrorType: 'static,
{
    let root_area = BitMapBackend::new(output_path, plot_size).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        FONT_TUPLE_MAIN_TITLE.into_font().color(&BLACK),
    ))?;
    let margined_root_area = root_area.margin(40, 5, 5, 5);
    let sub_plot_areas = margined_root_area.split_evenly((panel_titles.len().max(1), 1));
    let mut any_panel_plotted = false;

    for (panel_index, (area, panel_title)) in sub_plot_areas.iter().zip(panel_titles).enumerate() {
        match get_panel_plot_data(panel_index) {
            Some(plot_config) => {
                if plot_config.has_data() && plot_config.valid_ranges() {
                    draw_time_chart(area, &plot_config)?;
                    any_panel_plotted = true;
                } else {
                    let reason = if !plot_config.has_data() {
                        "No data points"
                    } else {
                        "Invalid ranges"
                    };
                    draw_unavailable_message(area, panel_title, reason)?;
                }
            }
            None => {
                draw_unavailable_message(area, panel_title, "Required columns not found")?;
            }
        }
    }

    root_area.present()?;
    if any_panel_plotted {
        info!("  Stacked plot saved as '{}'.", output_path.display());
    } else {
        info!(
            "  '{}' saved with placeholder messages only: no panel had data to plot.",
            output_path.display()
        );
    }
    Ok(any_panel_plotted)
}
