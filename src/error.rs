// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, aligning or deriving telemetry columns.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No CSV files found in {0}")]
    NoCsvFiles(PathBuf),

    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Column '{column}' has {actual} values, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Datasets do not overlap in time")]
    NoOverlap,

    #[error("Dataset '{0}' has no rows")]
    EmptyFrame(String),

    #[error("config error: {field}: {message}")]
    Config { field: String, message: String },
}

impl TelemetryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TelemetryError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        TelemetryError::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(column: &str, source_name: &str) -> Self {
        TelemetryError::MissingColumn {
            column: column.to_string(),
            source_name: source_name.to_string(),
        }
    }
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;

// src/error.rs
