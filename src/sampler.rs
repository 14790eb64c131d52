//! Bounded, reproducible sample extraction.
//!
//! `make_smoke_sample` resolves a source, reads a bounded number of rows,
//! downsamples them with a seeded RNG, trims to the required raw columns,
//! narrows dtypes, and writes a snappy-compressed parquet artifact.

use polars::prelude::DataFrame;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{MissingColumnPolicy, SampleConfig};
use crate::constants::columns::RAW_REQUIRED;
use crate::constants::sample::LOG_PREFIX;
use crate::errors::PipelineError;
use crate::frame::{column_names, contains};
use crate::narrowing::narrow_table;
use crate::source::{read_bounded, write_parquet};
use crate::transport::resolve_sources;
use crate::types::ColumnName;

/// Summary of a written sample artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleReport {
    /// Artifact location.
    pub path: PathBuf,
    /// Artifact size on disk.
    pub bytes: u64,
    /// Rows written.
    pub rows: usize,
    /// Columns written.
    pub columns: usize,
    /// Required columns the source did not provide.
    pub missing_columns: Vec<ColumnName>,
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} ({:.1} KB, {} rows, {} cols)",
            self.path.display(),
            self.bytes as f64 / 1024.0,
            self.rows,
            self.columns
        )
    }
}

/// Extract a bounded, reproducible sample of raw trip rows into a parquet artifact.
pub fn make_smoke_sample(config: &SampleConfig) -> Result<SampleReport, PipelineError> {
    let started = Instant::now();
    if config.rows == 0 {
        return Err(PipelineError::Configuration(
            "rows must be greater than zero".to_string(),
        ));
    }

    let sources = resolve_sources(&config.source)?;
    info!(
        "{LOG_PREFIX} sampling {} row(s) from {} {:?} file(s) under {}",
        config.rows,
        sources.files.len(),
        sources.format,
        config.source.display()
    );

    let frame = read_bounded(&sources, config.read_target())?;
    if frame.height() == 0 {
        return Err(PipelineError::EmptyResult(format!(
            "no rows read from {}",
            config.source.display()
        )));
    }

    let sampled = downsample(&frame, config.rows, config.seed)?;
    let (trimmed, missing_columns) = trim_columns(&sampled, config.missing_columns)?;
    let mut narrowed = narrow_table(&trimmed)?;

    if let Some(parent) = config.out.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let bytes = write_parquet(&mut narrowed, &config.out, None)?;

    let report = SampleReport {
        path: config.out.clone(),
        bytes,
        rows: narrowed.height(),
        columns: narrowed.width(),
        missing_columns,
    };
    info!(
        "{LOG_PREFIX} {report} in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(report)
}

/// Keep exactly `rows` rows drawn uniformly without replacement, in draw order.
///
/// Frames with at most `rows` rows are returned unchanged. The draw depends
/// only on the frame height, `rows`, and `seed`.
pub fn downsample(frame: &DataFrame, rows: usize, seed: u64) -> Result<DataFrame, PipelineError> {
    if frame.height() <= rows {
        return Ok(frame.clone());
    }
    Ok(frame.sample_n_literal(rows, false, true, Some(seed))?)
}

/// Restrict `frame` to the required raw columns, in required order.
///
/// Returns the trimmed frame and the required columns that were missing.
/// No required column at all is always a `SchemaMismatch`; a partial match is
/// a warning under `Intersect` and a `PartialSchema` error under `Strict`.
pub fn trim_columns(
    frame: &DataFrame,
    policy: MissingColumnPolicy,
) -> Result<(DataFrame, Vec<ColumnName>), PipelineError> {
    let keep: Vec<&str> = RAW_REQUIRED
        .iter()
        .copied()
        .filter(|name| contains(frame, name))
        .collect();
    let missing: Vec<ColumnName> = RAW_REQUIRED
        .iter()
        .filter(|name| !contains(frame, name))
        .map(|name| name.to_string())
        .collect();

    if keep.is_empty() {
        return Err(PipelineError::SchemaMismatch {
            missing,
            present: column_names(frame),
        });
    }
    if !missing.is_empty() {
        match policy {
            MissingColumnPolicy::Strict => {
                return Err(PipelineError::PartialSchema { missing });
            }
            MissingColumnPolicy::Intersect => {
                warn!("{LOG_PREFIX} source missing columns {missing:?}; keeping intersection only");
            }
        }
    }
    Ok((frame.select(keep)?, missing))
}
