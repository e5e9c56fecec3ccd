use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, analysing or exporting a dataset.
///
/// None of these are fatal: the session records them in the action log and
/// keeps whatever dataset was loaded before.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("no dataset loaded")]
    NoDataset,

    #[error("failed to export statistics to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl AnalysisError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AnalysisError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
