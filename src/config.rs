use std::path::PathBuf;

use crate::constants::{sample, training};
use crate::model::ModelKind;
use crate::preprocessing::NormalizationBounds;

/// What the sampler does when the source lacks some required raw columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingColumnPolicy {
    /// Warn and keep the available required columns; fail only when none exist.
    #[default]
    Intersect,
    /// Fail when any required column is missing.
    Strict,
}

/// Sample extraction settings.
#[derive(Clone, Debug)]
pub struct SampleConfig {
    /// Parquet/CSV file, or a directory containing them.
    pub source: PathBuf,
    /// Maximum rows written to the artifact.
    pub rows: usize,
    /// Artifact path; the parent directory is created when missing.
    pub out: PathBuf,
    /// Seed for the uniform downsample.
    pub seed: u64,
    /// Parquet rows read per requested row before downsampling.
    ///
    /// Values below 1 behave like 1, so at least `rows` rows are always read
    /// when available.
    pub oversample_factor: usize,
    /// Handling of required columns absent from the source.
    pub missing_columns: MissingColumnPolicy,
}

impl SampleConfig {
    /// Config for `source` with every other setting at its default.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            rows: sample::DEFAULT_ROWS,
            out: PathBuf::from(sample::DEFAULT_OUT),
            seed: sample::DEFAULT_SEED,
            oversample_factor: sample::OVERSAMPLE_FACTOR,
            missing_columns: MissingColumnPolicy::default(),
        }
    }

    /// Rows read from parquet sources before downsampling: `max(rows * factor, rows)`.
    pub fn read_target(&self) -> usize {
        self.rows
            .saturating_mul(self.oversample_factor)
            .max(self.rows)
    }
}

/// Training/evaluation settings.
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Model used by the trainer.
    pub model: ModelKind,
    /// Pipeline name reported in the metrics.
    pub pipeline: String,
    /// Rows read from the sample artifact.
    pub rows: usize,
    /// Held-out fraction in `(0, 1)`.
    pub test_size: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    /// Sample artifact (file or directory).
    pub data_path: PathBuf,
    /// Normalization bounds handed to the feature transformer.
    pub bounds: NormalizationBounds,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            pipeline: training::DEFAULT_PIPELINE.to_string(),
            rows: sample::DEFAULT_ROWS,
            test_size: training::DEFAULT_TEST_SIZE,
            seed: training::DEFAULT_SEED,
            data_path: PathBuf::from(sample::DEFAULT_OUT),
            bounds: NormalizationBounds::default(),
        }
    }
}
