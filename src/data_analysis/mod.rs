// src/data_analysis/mod.rs

pub mod consumption;
pub mod power_checks;
pub mod reference_compare;

// src/data_analysis/mod.rs
