// src/types.rs
// Type aliases to reduce complexity warnings

use std::error::Error;

/// `(x, y)` points of one plotted series; x is seconds since the Unix epoch for time charts.
pub type SeriesData = Vec<(f64, f64)>;

/// Result type of everything that renders charts.
pub type PlotResult<T = ()> = Result<T, Box<dyn Error>>;

