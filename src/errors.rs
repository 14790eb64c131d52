use std::io;
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::types::ColumnName;

/// Error type for sampling, preprocessing, and training failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{reason}: {}", path.display())]
    NotFound { path: PathBuf, reason: String },
    #[error("no rows available: {0}")]
    EmptyResult(String),
    #[error("missing columns {missing:?}; got {present:?}")]
    SchemaMismatch {
        missing: Vec<ColumnName>,
        present: Vec<ColumnName>,
    },
    #[error("source is missing required columns {missing:?}")]
    PartialSchema { missing: Vec<ColumnName> },
    #[error("column '{column}' has an unsupported type: {details}")]
    ColumnType { column: ColumnName, details: String },
    #[error("failed reading {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("failed writing {}: {reason}", path.display())]
    ArtifactWrite { path: PathBuf, reason: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("training failed: {0}")]
    Training(String),
    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn column_type(column: &str, details: impl Into<String>) -> Self {
        Self::ColumnType {
            column: column.to_string(),
            details: details.into(),
        }
    }
}
