use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::sample::{CSV_EXTENSION, PARQUET_EXTENSION};
use crate::errors::PipelineError;

/// On-disk layout of a trip source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Row-group organized columnar files.
    Parquet,
    /// Row-oriented delimited text.
    Csv,
}

impl SourceFormat {
    /// Format implied by a file extension; anything that is not parquet is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        if has_extension(path, PARQUET_EXTENSION) {
            SourceFormat::Parquet
        } else {
            SourceFormat::Csv
        }
    }
}

/// Files resolved from a caller-supplied source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFiles {
    pub format: SourceFormat,
    /// Sorted, never empty.
    pub files: Vec<PathBuf>,
}

/// Resolve a file or directory into readable source files.
///
/// Directories are scanned non-recursively. Parquet files win over CSV files;
/// CSV files are only used when no parquet file exists.
pub fn resolve_sources(source: &Path) -> Result<SourceFiles, PipelineError> {
    if source.is_dir() {
        for (extension, format) in [
            (PARQUET_EXTENSION, SourceFormat::Parquet),
            (CSV_EXTENSION, SourceFormat::Csv),
        ] {
            let files = list_files_with_extension(source, extension);
            if !files.is_empty() {
                return Ok(SourceFiles { format, files });
            }
        }
        return Err(PipelineError::NotFound {
            path: source.to_path_buf(),
            reason: format!("no .{PARQUET_EXTENSION}/.{CSV_EXTENSION} files in directory"),
        });
    }
    if source.is_file() {
        return Ok(SourceFiles {
            format: SourceFormat::from_path(source),
            files: vec![source.to_path_buf()],
        });
    }
    Err(PipelineError::NotFound {
        path: source.to_path_buf(),
        reason: "path not found".to_string(),
    })
}

/// Sorted regular files directly under `dir` with the given extension.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extension))
        .collect();
    files.sort();
    files
}

/// True if the path has `extension` (case-insensitive).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
