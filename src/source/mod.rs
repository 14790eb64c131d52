//! Readers and writers for trip tables on disk.
//!
//! Every reader opens its file handles inside the call and drops them before
//! returning, on success and on error alike.

use polars::prelude::DataFrame;
use std::path::Path;
use tracing::info;

use crate::constants::sample::{LOG_PREFIX, PARQUET_EXTENSION};
use crate::errors::PipelineError;
use crate::frame::concat_padded;
use crate::transport::fs::list_files_with_extension;
use crate::transport::{SourceFiles, SourceFormat};

/// Delimited text reader.
pub mod csv_file;
/// Parquet row-group planning, bounded reads, and the snappy artifact writer.
pub mod parquet_file;

pub use csv_file::read_csv;
pub use parquet_file::{RowGroupSpan, read_parquet, read_row_groups, row_group_span, write_parquet};

/// Read at least `target_rows` rows (when available) from resolved sources.
///
/// Parquet sources are read whole row group by whole row group across files,
/// stopping once the accumulated rows reach the target; files with differing
/// columns are null-padded into one frame. CSV sources only read the first
/// file, in full.
pub fn read_bounded(
    sources: &SourceFiles,
    target_rows: usize,
) -> Result<DataFrame, PipelineError> {
    match sources.format {
        SourceFormat::Parquet => {
            let mut frames = Vec::new();
            let mut rows = 0;
            for path in &sources.files {
                if rows >= target_rows {
                    break;
                }
                let (frame, span) = read_row_groups(path, target_rows - rows)?;
                rows += frame.height();
                info!(
                    "{LOG_PREFIX} read {} row group(s) from {} ({rows} rows so far)",
                    span.groups,
                    path.display()
                );
                frames.push(frame);
            }
            concat_padded(frames)
        }
        SourceFormat::Csv => {
            let path = sources.files.first().ok_or_else(|| {
                PipelineError::EmptyResult("no CSV files to read".to_string())
            })?;
            if sources.files.len() > 1 {
                info!(
                    "{LOG_PREFIX} reading only the first of {} CSV files: {}",
                    sources.files.len(),
                    path.display()
                );
            }
            read_csv(path, None)
        }
    }
}

/// Load a trip table for training: the first `nrows` rows of a file, or of the
/// first parquet file in a directory.
pub fn read_table(path: &Path, nrows: Option<usize>) -> Result<DataFrame, PipelineError> {
    let file = if path.is_dir() {
        list_files_with_extension(path, PARQUET_EXTENSION)
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::NotFound {
                path: path.to_path_buf(),
                reason: format!("no .{PARQUET_EXTENSION} files under directory"),
            })?
    } else if path.is_file() {
        path.to_path_buf()
    } else {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
            reason: "table not found".to_string(),
        });
    };

    match SourceFormat::from_path(&file) {
        SourceFormat::Parquet => read_parquet(&file, nrows),
        SourceFormat::Csv => read_csv(&file, nrows),
    }
}
