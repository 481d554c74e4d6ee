// src/data_analysis/consumption.rs

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::constants::ENERGY_COLUMN_MARKERS;
use crate::data_input::time_series::TimeSeriesFrame;
use crate::error::{TelemetryError, TelemetryResult};

/// Calendar bin used for consumption deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// One bin per calendar day, labelled by the date.
    Daily,
    /// One bin per Monday..Sunday week, labelled by the closing Sunday.
    Weekly,
}

impl Period {
    pub fn prefix(self) -> &'static str {
        match self {
            Period::Daily => "Daily",
            Period::Weekly => "Weekly",
        }
    }

    pub fn label_header(self) -> &'static str {
        match self {
            Period::Daily => "Date",
            Period::Weekly => "Week",
        }
    }

    /// Bin label for a date.
    pub fn bin_label(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => date,
            Period::Weekly => {
                let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
                date + Duration::days(days_to_sunday)
            }
        }
    }

    fn step(self) -> Duration {
        match self {
            Period::Daily => Duration::days(1),
            Period::Weekly => Duration::days(7),
        }
    }

    /// Derived column name for an energy register, e.g. `Daily_EP_TOTAL_kWh_Consumption`.
    pub fn column_name(self, column: &str) -> String {
        format!("{}_{}_Consumption", self.prefix(), column)
    }
}

/// Columns holding cumulative energy registers.
pub fn energy_columns(frame: &TimeSeriesFrame) -> Vec<String> {
    frame
        .column_names()
        .iter()
        .filter(|name| ENERGY_COLUMN_MARKERS.iter().any(|m| name.contains(m)))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionRow {
    pub label: NaiveDate,
    /// One entry per table column; `None` when the bin had no readings.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionTable {
    pub period: Period,
    pub columns: Vec<String>,
    pub rows: Vec<ConsumptionRow>,
}

impl ConsumptionTable {
    /// Header row: period label followed by the derived column names.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(self.period.label_header().to_string())
            .chain(self.columns.iter().map(|c| self.period.column_name(c)))
            .collect()
    }

    /// The table as a frame indexed by bin label (midnight), one column per derived name.
    pub fn to_frame(&self) -> TimeSeriesFrame {
        let index = self
            .rows
            .iter()
            .map(|row| row.label.and_time(NaiveTime::default()))
            .collect();
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(pos, column)| {
                let values = self
                    .rows
                    .iter()
                    .map(|row| row.values[pos].unwrap_or(f64::NAN))
                    .collect();
                (self.period.column_name(column), values)
            })
            .collect();
        // Every column is built from `rows`, so lengths match the index.
        TimeSeriesFrame::with_columns(format!("{} consumption", self.period.prefix()), index, columns)
            .unwrap_or_default()
    }

    pub fn write_csv(&self, writer: impl Write) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(self.header())?;
        for row in &self.rows {
            let mut record = vec![row.label.format("%Y-%m-%d").to_string()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|x| format!("{x:.4}")).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn export_csv(&self, path: &Path) -> TelemetryResult<()> {
        let file = File::create(path).map_err(|e| TelemetryError::io(path, e))?;
        self.write_csv(BufWriter::new(file))
            .map_err(|e| TelemetryError::csv(path, e))
    }
}

impl fmt::Display for ConsumptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        let widths: Vec<usize> = header.iter().map(|h| h.len().max(10)).collect();
        for (h, &w) in header.iter().zip(&widths) {
            write!(f, "{h:>w$}  ")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:>w$}  ", row.label.format("%Y-%m-%d").to_string(), w = widths[0])?;
            for (value, &w) in row.values.iter().zip(&widths[1..]) {
                match value {
                    Some(v) => write!(f, "{v:>w$.3}  ")?,
                    None => write!(f, "{:>w$}  ", "NaN")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Consumption per period for cumulative energy registers: the last reading in each bin
/// minus the first one. NaN readings are ignored; bins are contiguous between the first
/// and last period present in the data.
pub fn calculate_consumption(
    frame: &TimeSeriesFrame,
    columns: &[String],
    period: Period,
) -> TelemetryResult<ConsumptionTable> {
    let (start, end) = frame
        .time_bounds()
        .ok_or_else(|| TelemetryError::EmptyFrame(frame.name().to_string()))?;
    let first_bin = period.bin_label(start.date());
    let last_bin = period.bin_label(end.date());

    let mut labels = Vec::new();
    let mut label = first_bin;
    while label <= last_bin {
        labels.push(label);
        label += period.step();
    }

    // (first, last) reading per bin and column.
    let mut bounds: Vec<Vec<Option<(f64, f64)>>> = vec![vec![None; labels.len()]; columns.len()];
    for (col_pos, column) in columns.iter().enumerate() {
        let data = frame.require(column)?;
        for (ts, &value) in frame.index().iter().zip(data.iter()) {
            if value.is_nan() {
                continue;
            }
            let bin = (period.bin_label(ts.date()) - first_bin).num_days() / period.step().num_days();
            let slot = &mut bounds[col_pos][bin as usize];
            *slot = match *slot {
                None => Some((value, value)),
                Some((first, _)) => Some((first, value)),
            };
        }
    }

    let rows = labels
        .iter()
        .enumerate()
        .map(|(bin, &label)| ConsumptionRow {
            label,
            values: bounds
                .iter()
                .map(|col| col[bin].map(|(first, last)| last - first))
                .collect(),
        })
        .collect();

    Ok(ConsumptionTable {
        period,
        columns: columns.to_vec(),
        rows,
    })
}

/// Writes a table to stdout under a heading, matching the report format of the other analyses.
pub fn print_consumption(table: &ConsumptionTable, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n{} Consumption:", table.period.prefix())?;
    write!(out, "{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn energy_frame() -> TimeSeriesFrame {
        // 2024-12-06 is a Friday, 2024-12-08 a Sunday, 2024-12-10 a Tuesday.
        TimeSeriesFrame::with_columns(
            "meter",
            vec![
                at(2024, 12, 6, 0),
                at(2024, 12, 6, 23),
                at(2024, 12, 8, 1),
                at(2024, 12, 8, 12),
                at(2024, 12, 10, 6),
                at(2024, 12, 10, 18),
            ],
            vec![
                ("EP_TOTAL_kWh".to_string(), vec![100.0, 110.0, 130.0, f64::NAN, 150.0, 165.0]),
                ("I1".to_string(), vec![1.0; 6]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_energy_columns() {
        let mut f = energy_frame();
        f.insert_column("EQ_TOTAL_kvarh", ndarray::Array1::zeros(6)).unwrap();
        assert_eq!(energy_columns(&f), vec!["EP_TOTAL_kWh", "EQ_TOTAL_kvarh"]);
    }

    #[test]
    fn test_weekly_label_is_closing_sunday() {
        let friday = NaiveDate::from_ymd_opt(2024, 12, 6).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 12, 8).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 12, 9).unwrap();
        assert_eq!(Period::Weekly.bin_label(friday), sunday);
        assert_eq!(Period::Weekly.bin_label(sunday), sunday);
        assert_eq!(
            Period::Weekly.bin_label(monday),
            NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()
        );
    }

    #[test]
    fn test_daily_consumption_with_gap_day() {
        let f = energy_frame();
        let table =
            calculate_consumption(&f, &["EP_TOTAL_kWh".to_string()], Period::Daily).unwrap();
        let values: Vec<Option<f64>> = table.rows.iter().map(|r| r.values[0]).collect();
        // Dec 6, 7 (no data), 8 (single reading), 9 (no data), 10
        assert_eq!(values, vec![Some(10.0), None, Some(0.0), None, Some(15.0)]);
        assert_eq!(
            table.header(),
            vec!["Date", "Daily_EP_TOTAL_kWh_Consumption"]
        );
    }

    #[test]
    fn test_weekly_consumption() {
        let f = energy_frame();
        let table =
            calculate_consumption(&f, &["EP_TOTAL_kWh".to_string()], Period::Weekly).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, NaiveDate::from_ymd_opt(2024, 12, 8).unwrap());
        assert_eq!(table.rows[0].values[0], Some(30.0));
        assert_eq!(table.rows[1].values[0], Some(15.0));
        assert_eq!(table.header()[0], "Week");
    }

    #[test]
    fn test_write_csv_leaves_empty_bins_blank() {
        let f = energy_frame();
        let table =
            calculate_consumption(&f, &["EP_TOTAL_kWh".to_string()], Period::Daily).unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Daily_EP_TOTAL_kWh_Consumption");
        assert_eq!(lines[1], "2024-12-06,10.0000");
        assert_eq!(lines[2], "2024-12-07,");
    }

    #[test]
    fn test_report_layout() {
        let table = ConsumptionTable {
            period: Period::Daily,
            columns: vec!["EP_TOTAL_kWh".to_string()],
            rows: vec![
                ConsumptionRow {
                    label: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap(),
                    values: vec![Some(2.5)],
                },
                ConsumptionRow {
                    label: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
                    values: vec![None],
                },
            ],
        };
        let pad = |n: usize| " ".repeat(n);
        // "Date" is padded to 10 columns, the 30-character value header sets its own width.
        let expected = format!(
            "{}Date  Daily_EP_TOTAL_kWh_Consumption  \n\
             2024-12-09  {}2.500  \n\
             2024-12-10  {}NaN  \n",
            pad(6),
            pad(25),
            pad(27),
        );
        assert_eq!(table.to_string(), expected);

        let mut out = Vec::new();
        print_consumption(&table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("\nDaily Consumption:\n{expected}")
        );
    }

    #[test]
    fn test_to_frame() {
        let f = energy_frame();
        let table =
            calculate_consumption(&f, &["EP_TOTAL_kWh".to_string()], Period::Weekly).unwrap();
        let frame = table.to_frame();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.index()[0], at(2024, 12, 8, 0));
        assert_eq!(
            frame.column("Weekly_EP_TOTAL_kWh_Consumption").unwrap().to_vec(),
            vec![30.0, 15.0]
        );
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        let f = TimeSeriesFrame::new("empty", Vec::new());
        assert!(matches!(
            calculate_consumption(&f, &[], Period::Daily),
            Err(TelemetryError::EmptyFrame(_))
        ));
    }
}
