//! TOML-based run settings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use plotters::style::RGBColor;
use serde::Deserialize;

use crate::color_map::{parse_color, ColorMap};
use crate::constants::{
    DEFAULT_ALIGN_STEP_SECONDS, DEFAULT_APPARENT_POWER_TOLERANCE, DEFAULT_METER_POWER_COLUMN,
    DEFAULT_REFERENCE_FILE, DEFAULT_REFERENCE_POWER_COLUMN, DEFAULT_REFERENCE_TIME_COLUMN,
    DEFAULT_TIME_COLUMN, MAX_ALIGN_STEP_SECONDS, PLOT_HEIGHT, PLOT_WIDTH,
};
use crate::error::TelemetryError;

/// Top-level settings parsed from TOML. Every field has a default, so an empty file (or
/// no file at all) gives the stock behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Column name to color (name or `#rrggbb`), applied over the built-in map.
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

/// Input column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Timestamp column of the meter CSV files.
    pub time_column: String,
    /// Timestamp column of the reference export.
    pub reference_time_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            reference_time_column: DEFAULT_REFERENCE_TIME_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Largest accepted S - sqrt(P^2 + Q^2) residual (kVA).
    pub apparent_power_tolerance: f64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            apparent_power_tolerance: DEFAULT_APPARENT_POWER_TOLERANCE,
        }
    }
}

/// Reference (CMS) comparison parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    pub file: PathBuf,
    /// Spacing of the common alignment grid in seconds (1 to 86400).
    pub align_step_seconds: i64,
    pub meter_power_column: String,
    pub reference_power_column: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_REFERENCE_FILE),
            align_step_seconds: DEFAULT_ALIGN_STEP_SECONDS,
            meter_power_column: DEFAULT_METER_POWER_COLUMN.to_string(),
            reference_power_column: DEFAULT_REFERENCE_POWER_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving PNG charts and CSV exports.
    pub directory: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Also write daily/weekly consumption tables as CSV.
    pub export_consumption_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            export_consumption_csv: true,
        }
    }
}

fn config_error(field: impl Into<String>, message: impl Into<String>) -> TelemetryError {
    TelemetryError::Config {
        field: field.into(),
        message: message.into(),
    }
}

impl Settings {
    /// Parses settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, TelemetryError> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error("config", format!("cannot read \"{}\": {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from a TOML string. Unknown keys are rejected.
    pub fn from_toml_str(s: &str) -> Result<Self, TelemetryError> {
        toml::from_str(s).map_err(|e| config_error("toml", e.to_string()))
    }

    /// Validates all fields and returns every violation found.
    pub fn validate(&self) -> Vec<TelemetryError> {
        let mut errors = Vec::new();

        if !self.checks.apparent_power_tolerance.is_finite() {
            errors.push(config_error("checks.apparent_power_tolerance", "must be finite"));
        }
        if !(1..=MAX_ALIGN_STEP_SECONDS).contains(&self.reference.align_step_seconds) {
            errors.push(config_error(
                "reference.align_step_seconds",
                format!("must be between 1 and {MAX_ALIGN_STEP_SECONDS}"),
            ));
        }
        if self.output.width == 0 {
            errors.push(config_error("output.width", "must be > 0"));
        }
        if self.output.height == 0 {
            errors.push(config_error("output.height", "must be > 0"));
        }
        if self.input.time_column.trim().is_empty() {
            errors.push(config_error("input.time_column", "must not be empty"));
        }
        if self.input.reference_time_column.trim().is_empty() {
            errors.push(config_error("input.reference_time_column", "must not be empty"));
        }
        for (column, value) in &self.colors {
            if parse_color(value).is_none() {
                errors.push(config_error(
                    format!("colors.{column}"),
                    format!("unknown color \"{value}\""),
                ));
            }
        }

        errors
    }

    /// Grid step; steps above one day are capped there.
    pub fn align_step(&self) -> Duration {
        Duration::seconds(self.reference.align_step_seconds.min(MAX_ALIGN_STEP_SECONDS))
    }

    /// Applies command-line overrides on top of the file settings.
    pub fn apply_overrides(&mut self, output_dir: Option<&Path>, reference_file: Option<&Path>) {
        if let Some(dir) = output_dir {
            self.output.directory = dir.to_path_buf();
        }
        if let Some(file) = reference_file {
            self.reference.file = file.to_path_buf();
        }
    }

    pub fn plot_size(&self) -> (u32, u32) {
        (self.output.width, self.output.height)
    }

    /// Built-in color map with the `[colors]` overrides applied. Unparseable entries are
    /// ignored here; [`validate`](Self::validate) reports them.
    pub fn color_map(&self) -> ColorMap {
        let overrides: HashMap<String, RGBColor> = self
            .colors
            .iter()
            .filter_map(|(column, value)| parse_color(value).map(|c| (column.clone(), c)))
            .collect();
        ColorMap::with_overrides(&overrides)
    }
}
