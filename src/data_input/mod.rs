// src/data_input/mod.rs

pub mod csv_loader;
pub mod time_series;
pub mod timestamp;
