// src/lib.rs - Library interface for internal module access

pub mod color_map;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod file_prep;
pub mod font_config;
pub mod plot_framework;
pub mod plot_functions;
pub mod types;

// Crate version, overridable at build time through VERGEN_GIT_SEMVER.
pub fn crate_version() -> &'static str {
    option_env!("VERGEN_GIT_SEMVER").unwrap_or(env!("CARGO_PKG_VERSION"))
}
