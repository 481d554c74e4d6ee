// src/data_input/time_series.rs

use std::collections::HashMap;

use chrono::NaiveDateTime;
use ndarray::Array1;

use crate::data_input::timestamp::to_epoch_seconds;
use crate::error::{TelemetryError, TelemetryResult};
use crate::types::SeriesData;

/// Column-oriented time series: one timestamp index shared by named `f64` columns.
///
/// Missing or unparseable samples are stored as NaN, so every column always has
/// exactly `index.len()` values.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesFrame {
    name: String,
    index: Vec<NaiveDateTime>,
    names: Vec<String>,
    values: Vec<Array1<f64>>,
}

impl TimeSeriesFrame {
    pub fn new(name: impl Into<String>, index: Vec<NaiveDateTime>) -> Self {
        Self {
            name: name.into(),
            index,
            names: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a frame from an index and `(name, values)` pairs.
    pub fn with_columns(
        name: impl Into<String>,
        index: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> TelemetryResult<Self> {
        let mut frame = Self::new(name, index);
        for (column, data) in columns {
            frame.insert_column(&column, Array1::from(data))?;
        }
        Ok(frame)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, column: &str) -> Option<&Array1<f64>> {
        self.position(column).map(|pos| &self.values[pos])
    }

    /// Like [`column`](Self::column) but reports which dataset lacks the column.
    pub fn require(&self, column: &str) -> TelemetryResult<&Array1<f64>> {
        self.column(column)
            .ok_or_else(|| TelemetryError::missing_column(column, &self.name))
    }

    /// Inserts a column, replacing an existing one with the same name in place.
    pub fn insert_column(&mut self, column: &str, data: Array1<f64>) -> TelemetryResult<()> {
        if data.len() != self.index.len() {
            return Err(TelemetryError::LengthMismatch {
                column: column.to_string(),
                expected: self.index.len(),
                actual: data.len(),
            });
        }
        match self.position(column) {
            Some(pos) => self.values[pos] = data,
            None => {
                self.names.push(column.to_string());
                self.values.push(data);
            }
        }
        Ok(())
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }

    /// Stacks frames row-wise. The result carries the union of all columns in first-seen
    /// order; rows from a frame lacking a column get NaN there.
    pub fn concat(name: impl Into<String>, frames: &[TimeSeriesFrame]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for frame in frames {
            for column in &frame.names {
                if !names.contains(column) {
                    names.push(column.clone());
                }
            }
        }

        let total: usize = frames.iter().map(TimeSeriesFrame::len).sum();
        let mut index = Vec::with_capacity(total);
        let mut buffers: Vec<Vec<f64>> = vec![Vec::with_capacity(total); names.len()];

        for frame in frames {
            index.extend_from_slice(&frame.index);
            for (buffer, column) in buffers.iter_mut().zip(&names) {
                match frame.column(column) {
                    Some(data) => buffer.extend(data.iter().copied()),
                    None => buffer.extend(std::iter::repeat(f64::NAN).take(frame.len())),
                }
            }
        }

        Self {
            name: name.into(),
            index,
            names,
            values: buffers.into_iter().map(Array1::from).collect(),
        }
    }

    /// Sorts rows by timestamp. Rows sharing a timestamp keep their relative order.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.index.len()).collect();
        order.sort_by_key(|&i| self.index[i]);
        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return;
        }
        self.index = order.iter().map(|&i| self.index[i]).collect();
        for data in &mut self.values {
            *data = order.iter().map(|&i| data[i]).collect();
        }
    }

    /// Earliest and latest timestamp, if any rows exist.
    pub fn time_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.index.iter().min()?;
        let max = self.index.iter().max()?;
        Some((*min, *max))
    }

    /// Conforms the frame to `new_index`. Each target timestamp takes the row with exactly that
    /// timestamp, or NaN when there is none. Duplicate timestamps resolve to their first row.
    pub fn reindex(&self, new_index: &[NaiveDateTime]) -> Self {
        let mut lookup: HashMap<NaiveDateTime, usize> = HashMap::with_capacity(self.index.len());
        for (row, ts) in self.index.iter().enumerate() {
            lookup.entry(*ts).or_insert(row);
        }
        let rows: Vec<Option<usize>> = new_index.iter().map(|ts| lookup.get(ts).copied()).collect();

        let values = self
            .values
            .iter()
            .map(|data| {
                rows.iter()
                    .map(|row| row.map_or(f64::NAN, |r| data[r]))
                    .collect::<Array1<f64>>()
            })
            .collect();

        Self {
            name: self.name.clone(),
            index: new_index.to_vec(),
            names: self.names.clone(),
            values,
        }
    }

    /// Number of timestamps that occur more than once.
    pub fn duplicate_timestamps(&self) -> usize {
        let mut seen: HashMap<NaiveDateTime, usize> = HashMap::with_capacity(self.index.len());
        for ts in &self.index {
            *seen.entry(*ts).or_insert(0) += 1;
        }
        seen.values().filter(|&&count| count > 1).count()
    }

    /// Samples of a column as `(epoch seconds, value)` points, split into runs at every
    /// missing (non-finite) sample so a plotted line breaks across gaps.
    pub fn series_runs(&self, column: &str) -> Option<Vec<SeriesData>> {
        let data = self.column(column)?;
        let mut runs = Vec::new();
        let mut current = SeriesData::new();
        for (ts, &v) in self.index.iter().zip(data.iter()) {
            if v.is_finite() {
                current.push((to_epoch_seconds(*ts), v));
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        Some(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn minute(m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 9)
            .unwrap()
            .and_hms_opt(10, m, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_and_replace_column() {
        let mut frame = TimeSeriesFrame::new("meter", vec![minute(0), minute(1)]);
        frame.insert_column("P1", Array1::from(vec![1.0, 2.0])).unwrap();
        frame.insert_column("Q1", Array1::from(vec![3.0, 4.0])).unwrap();
        frame.insert_column("P1", Array1::from(vec![5.0, 6.0])).unwrap();
        assert_eq!(frame.column_names(), ["P1", "Q1"]);
        assert_eq!(frame.column("P1").unwrap().to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_insert_rejects_wrong_length() {
        let mut frame = TimeSeriesFrame::new("meter", vec![minute(0), minute(1)]);
        let err = frame
            .insert_column("P1", Array1::from(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, TelemetryError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_require_names_dataset() {
        let frame = TimeSeriesFrame::new("cms", vec![minute(0)]);
        let err = frame.require("site_power").unwrap_err();
        assert_eq!(err.to_string(), "Missing column 'site_power' in cms");
    }

    #[test]
    fn test_concat_unions_columns_with_nan_fill() {
        let a = TimeSeriesFrame::with_columns(
            "a",
            vec![minute(0)],
            vec![("P1".to_string(), vec![1.0])],
        )
        .unwrap();
        let b = TimeSeriesFrame::with_columns(
            "b",
            vec![minute(1), minute(2)],
            vec![
                ("Q1".to_string(), vec![2.0, 3.0]),
                ("P1".to_string(), vec![4.0, 5.0]),
            ],
        )
        .unwrap();
        let all = TimeSeriesFrame::concat("all", &[a, b]);
        assert_eq!(all.len(), 3);
        assert_eq!(all.column_names(), ["P1", "Q1"]);
        assert_eq!(all.column("P1").unwrap().to_vec(), vec![1.0, 4.0, 5.0]);
        let q1 = all.column("Q1").unwrap();
        assert!(q1[0].is_nan());
        assert_eq!(q1[2], 3.0);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut frame = TimeSeriesFrame::with_columns(
            "meter",
            vec![minute(2), minute(0), minute(2), minute(1)],
            vec![("P1".to_string(), vec![20.0, 0.0, 21.0, 10.0])],
        )
        .unwrap();
        frame.sort_by_time();
        assert_eq!(frame.index(), [minute(0), minute(1), minute(2), minute(2)]);
        assert_eq!(frame.column("P1").unwrap().to_vec(), vec![0.0, 10.0, 20.0, 21.0]);
        assert_eq!(frame.time_bounds(), Some((minute(0), minute(2))));
        assert_eq!(frame.duplicate_timestamps(), 1);
    }

    #[test]
    fn test_reindex_exact_match_and_first_duplicate() {
        let frame = TimeSeriesFrame::with_columns(
            "meter",
            vec![minute(0), minute(2), minute(2)],
            vec![("P1".to_string(), vec![1.0, 2.0, 3.0])],
        )
        .unwrap();
        let aligned = frame.reindex(&[minute(0), minute(1), minute(2)]);
        let p1 = aligned.column("P1").unwrap();
        assert_eq!(p1[0], 1.0);
        assert!(p1[1].is_nan());
        assert_eq!(p1[2], 2.0);
        assert_eq!(aligned.name(), "meter");
    }

    #[test]
    fn test_series_runs_break_at_gaps() {
        let frame = TimeSeriesFrame::with_columns(
            "meter",
            vec![minute(0), minute(1), minute(2), minute(3), minute(4)],
            vec![("P".to_string(), vec![1.0, f64::NAN, 3.0, f64::INFINITY, 5.0])],
        )
        .unwrap();
        let runs = frame.series_runs("P").unwrap();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], vec![(to_epoch_seconds(minute(0)), 1.0)]);
        assert_eq!(runs[1], vec![(to_epoch_seconds(minute(2)), 3.0)]);
        assert_eq!(runs[2], vec![(to_epoch_seconds(minute(4)), 5.0)]);

        let gap = TimeSeriesFrame::with_columns(
            "meter",
            vec![minute(0), minute(1), minute(2)],
            vec![("P".to_string(), vec![1.0, f64::NAN, 3.0])],
        )
        .unwrap();
        assert_eq!(gap.series_runs("P").unwrap().len(), 2);
    }

    #[test]
    fn test_series_runs_edge_cases() {
        let frame = TimeSeriesFrame::with_columns(
            "meter",
            vec![minute(0), minute(1)],
            vec![
                ("P1".to_string(), vec![f64::NAN, 7.0]),
                ("Q1".to_string(), vec![f64::NAN, f64::NAN]),
            ],
        )
        .unwrap();
        let runs = frame.series_runs("P1").unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0][0].1, 7.0);
        assert!(frame.series_runs("Q1").unwrap().is_empty());
        assert!(frame.series_runs("S1").is_none());
        assert_eq!(TimeSeriesFrame::default().time_bounds(), None);
    }
}
