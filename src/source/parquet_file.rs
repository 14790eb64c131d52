use parquet::file::reader::{FileReader, SerializedFileReader};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::errors::PipelineError;

/// Leading row groups of a parquet file that cover a requested row count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowGroupSpan {
    /// Whole row groups taken from the front of the file.
    pub groups: usize,
    /// Rows held by those groups.
    pub rows: usize,
}

/// Plan which leading row groups of `path` hold at least `target_rows` rows.
///
/// Only the footer is read; the handle is dropped before returning.
pub fn row_group_span(path: &Path, target_rows: usize) -> Result<RowGroupSpan, PipelineError> {
    let file = File::open(path).map_err(|err| PipelineError::unreadable(path, err))?;
    let reader = SerializedFileReader::new(file)
        .map_err(|err| PipelineError::unreadable(path, format!("invalid parquet: {err}")))?;

    let mut span = RowGroupSpan::default();
    for group in reader.metadata().row_groups() {
        if span.rows >= target_rows {
            break;
        }
        span.rows += usize::try_from(group.num_rows()).unwrap_or(0);
        span.groups += 1;
    }
    Ok(span)
}

/// Read the first `rows` rows of a parquet file, or all of it for `None`.
pub fn read_parquet(path: &Path, rows: Option<usize>) -> Result<DataFrame, PipelineError> {
    let file = File::open(path).map_err(|err| PipelineError::unreadable(path, err))?;
    ParquetReader::new(file)
        .with_slice(rows.map(|rows| (0, rows)))
        .finish()
        .map_err(|err| PipelineError::unreadable(path, err))
}

/// Read whole row groups from the front of `path` until at least
/// `target_rows` rows are loaded (or the file ends).
pub fn read_row_groups(
    path: &Path,
    target_rows: usize,
) -> Result<(DataFrame, RowGroupSpan), PipelineError> {
    let span = row_group_span(path, target_rows)?;
    let frame = read_parquet(path, Some(span.rows))?;
    debug!(
        "read {} row group(s) from {} ({} rows)",
        span.groups,
        path.display(),
        frame.height()
    );
    Ok((frame, span))
}

/// Write `frame` as a snappy-compressed parquet file and return its size in
/// bytes. `row_group_size` of `None` keeps the writer's default grouping.
pub fn write_parquet(
    frame: &mut DataFrame,
    path: &Path,
    row_group_size: Option<usize>,
) -> Result<u64, PipelineError> {
    let mut file = File::create(path).map_err(|err| PipelineError::write_failed(path, err))?;
    ParquetWriter::new(&mut file)
        .with_compression(ParquetCompression::Snappy)
        .with_row_group_size(row_group_size)
        .finish(frame)
        .map_err(|err| PipelineError::write_failed(path, err))
}
