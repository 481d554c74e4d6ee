// src/commands/prep.rs

use std::path::Path;

use crate::file_prep::{flatten_subfolders, unzip_gz_files};
use crate::types::PlotResult;

pub fn run_unzip(dir: &Path) -> PlotResult {
    let summary = unzip_gz_files(dir)?;
    if !summary.found_any() {
        println!("No .gz files found in {}.", dir.display());
        return Ok(());
    }
    println!(
        "Extracted {} file(s), {} failed.",
        summary.extracted.len(),
        summary.failed.len()
    );
    Ok(())
}

pub fn run_flatten(dir: &Path) -> PlotResult {
    let summary = flatten_subfolders(dir)?;
    println!(
        "Moved {} CSV file(s) ({} replaced), {} folder(s) without a matching CSV.",
        summary.moved.len(),
        summary.replaced.len(),
        summary.skipped.len()
    );
    Ok(())
}
