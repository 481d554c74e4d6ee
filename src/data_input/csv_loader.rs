// src/data_input/csv_loader.rs

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::data_input::time_series::TimeSeriesFrame;
use crate::data_input::timestamp::parse_timestamp;
use crate::error::{TelemetryError, TelemetryResult};

const UTF8_BOM: char = '\u{feff}';

/// Makes header names unique the way dataframe readers do: the second `P1` becomes `P1.1`.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while out.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

/// Parses one CSV file into a frame indexed by `time_column`.
///
/// Rows whose timestamp cannot be parsed are skipped with a warning. Any other cell that
/// is empty or not a number becomes NaN.
pub fn load_csv_file(path: &Path, time_column: &str) -> TelemetryResult<TimeSeriesFrame> {
    let file = File::open(path).map_err(|e| TelemetryError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| TelemetryError::csv(path, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            h.trim().trim_matches('"').to_string()
        })
        .collect();
    let headers = dedupe_headers(&raw_headers);

    let source_name = path.display().to_string();
    let time_idx = headers
        .iter()
        .position(|h| h == time_column)
        .ok_or_else(|| TelemetryError::missing_column(time_column, &source_name))?;
    let value_columns: Vec<usize> = (0..headers.len()).filter(|&i| i != time_idx).collect();
    debug!("Headers found in '{}': {:?}", source_name, headers);

    let mut index = Vec::new();
    let mut buffers: Vec<Vec<f64>> = vec![Vec::new(); value_columns.len()];
    let mut skipped = 0usize;

    for (row_index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping row {} of '{}' due to CSV read error: {}", row_index + 1, source_name, e);
                skipped += 1;
                continue;
            }
        };

        let Some(ts) = record.get(time_idx).and_then(parse_timestamp) else {
            warn!("Skipping row {} of '{}' due to missing or invalid '{}'", row_index + 1, source_name, time_column);
            skipped += 1;
            continue;
        };

        index.push(ts);
        for (buffer, &csv_idx) in buffers.iter_mut().zip(&value_columns) {
            let value = record
                .get(csv_idx)
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            buffer.push(value);
        }
    }

    let columns = value_columns
        .iter()
        .map(|&i| headers[i].clone())
        .zip(buffers)
        .collect();
    let frame = TimeSeriesFrame::with_columns(source_name, index, columns)?;
    debug!("Read {} rows ({} skipped) from '{}'", frame.len(), skipped, path.display());
    Ok(frame)
}

/// CSV files directly inside `dir` (no recursion), sorted by file name.
pub fn list_csv_files(dir: &Path) -> TelemetryResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TelemetryError::NotADirectory(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| TelemetryError::io(dir, e))? {
        let entry = entry.map_err(|e| TelemetryError::io(dir, e))?;
        let path = entry.path();
        let is_csv = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every CSV file in `dir`, stacks them and sorts the result by time.
pub fn load_directory(dir: &Path, time_column: &str) -> TelemetryResult<TimeSeriesFrame> {
    info!("Loading data from {}...", dir.display());
    let files = list_csv_files(dir)?;
    if files.is_empty() {
        return Err(TelemetryError::NoCsvFiles(dir.to_path_buf()));
    }

    let mut frames = Vec::with_capacity(files.len());
    for file in &files {
        frames.push(load_csv_file(file, time_column)?);
    }

    let mut all_data = TimeSeriesFrame::concat(dir.display().to_string(), &frames);
    all_data.sort_by_time();
    info!(
        "Loaded {} rows and {} columns from {} file(s)",
        all_data.len(),
        all_data.column_names().len(),
        files.len()
    );
    Ok(all_data)
}

/// Loads a single reference export (e.g. the CMS site-power file) sorted by time.
pub fn load_reference_file(path: &Path, time_column: &str) -> TelemetryResult<TimeSeriesFrame> {
    info!("Loading reference data from {}...", path.display());
    let mut frame = load_csv_file(path, time_column)?;
    frame.sort_by_time();
    Ok(frame)
}
