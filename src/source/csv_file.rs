use polars::prelude::*;
use std::path::Path;

use crate::errors::PipelineError;

/// Read a headed CSV file, letting polars infer one dtype per column.
///
/// Empty cells are nulls. A column with no values at all comes back as text.
pub fn read_csv(path: &Path, rows: Option<usize>) -> Result<DataFrame, PipelineError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_n_rows(rows)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|err| PipelineError::unreadable(path, err))
}
