// src/file_prep.rs
//
// Housekeeping for raw meter exports: exports arrive as `.gz` files or as one
// `<name>/<name>.csv` folder per export, and both need to become flat CSV files
// in one directory before loading.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{error, info, warn};

use crate::error::{TelemetryError, TelemetryResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnzipSummary {
    pub extracted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl UnzipSummary {
    pub fn found_any(&self) -> bool {
        !self.extracted.is_empty() || !self.failed.is_empty()
    }
}

fn read_dir_sorted(dir: &Path) -> TelemetryResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TelemetryError::NotADirectory(dir.to_path_buf()));
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| TelemetryError::io(dir, e))? {
        entries.push(entry.map_err(|e| TelemetryError::io(dir, e))?.path());
    }
    entries.sort();
    Ok(entries)
}

fn gunzip(gz_path: &Path, output_path: &Path) -> io::Result<u64> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(gz_path)?));
    let mut out = BufWriter::new(File::create(output_path)?);
    io::copy(&mut decoder, &mut out)
}

/// Decompresses every `*.gz` file in `dir` next to itself, without the `.gz` suffix.
/// Existing outputs are overwritten. A corrupt archive is logged and skipped.
pub fn unzip_gz_files(dir: &Path) -> TelemetryResult<UnzipSummary> {
    let mut summary = UnzipSummary::default();
    let gz_files: Vec<PathBuf> = read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "gz"))
        .collect();

    if gz_files.is_empty() {
        info!("No .gz files found in {}", dir.display());
        return Ok(summary);
    }

    for gz_path in gz_files {
        let output_path = gz_path.with_extension("");
        info!(
            "Unzipping {} to {}...",
            gz_path.display(),
            output_path.display()
        );
        match gunzip(&gz_path, &output_path) {
            Ok(bytes) => {
                info!("  wrote {} bytes", bytes);
                summary.extracted.push(output_path);
            }
            Err(e) => {
                error!("Error processing {}: {}", gz_path.display(), e);
                // Do not leave a truncated output behind.
                let _ = fs::remove_file(&output_path);
                summary.failed.push(gz_path);
            }
        }
    }

    info!("Finished unzipping files in {}", dir.display());
    Ok(summary)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlattenSummary {
    /// CSV files now sitting directly in the parent directory.
    pub moved: Vec<PathBuf>,
    /// Existing parent-level files that were replaced.
    pub replaced: Vec<PathBuf>,
    /// Subfolders without a `<name>/<name>.csv` file.
    pub skipped: Vec<PathBuf>,
    /// Subfolders that still held other files after the move.
    pub kept_folders: Vec<PathBuf>,
}

/// For every subfolder `X` of `parent` holding `X/X.csv`, moves that file to `parent/X.csv`
/// (replacing an existing file) and removes the subfolder once it is empty.
pub fn flatten_subfolders(parent: &Path) -> TelemetryResult<FlattenSummary> {
    let mut summary = FlattenSummary::default();

    for subfolder in read_dir_sorted(parent)?.into_iter().filter(|p| p.is_dir()) {
        let Some(name) = subfolder.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        let csv_name = format!("{name}.csv");
        let csv_path = subfolder.join(&csv_name);
        if !csv_path.is_file() {
            info!("No CSV file named {} in {}", csv_name, subfolder.display());
            summary.skipped.push(subfolder);
            continue;
        }

        let destination = parent.join(&csv_name);
        if destination.exists() {
            fs::remove_file(&destination).map_err(|e| TelemetryError::io(&destination, e))?;
            info!("Removed existing file: {}", destination.display());
            summary.replaced.push(destination.clone());
        }
        move_file(&csv_path, &destination)?;

        match fs::remove_dir(&subfolder) {
            Ok(()) => info!("Moved {} to {} and deleted {}", csv_name, parent.display(), name),
            Err(e) => {
                warn!("Moved {} but kept {}: {}", csv_name, subfolder.display(), e);
                summary.kept_folders.push(subfolder);
            }
        }
        summary.moved.push(destination);
    }

    Ok(summary)
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> TelemetryResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| TelemetryError::io(from, e))?;
    fs::remove_file(from).map_err(|e| TelemetryError::io(from, e))
}
