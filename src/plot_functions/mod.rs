// src/plot_functions/mod.rs

pub mod plot_apparent_power_check;
pub mod plot_consumption;
pub mod plot_phase_quantities;
pub mod plot_reference_comparison;
pub mod time_series_chart;

// src/plot_functions/mod.rs
