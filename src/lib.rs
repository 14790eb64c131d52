#![doc = include_str!("../README.md")]

/// CLI runners behind the `make_smoke_sample` and `train` binaries.
pub mod apps;
/// Sampling and training configuration types.
pub mod config;
/// Centralized column names, defaults, and thresholds.
pub mod constants;
/// Helpers over polars data frames.
pub mod frame;
/// Held-out regression metrics.
pub mod metrics;
/// Mean, ridge, and random-forest regressors.
pub mod model;
/// Integer/float width narrowing for sample artifacts.
pub mod narrowing;
/// Named loaders turning a sample artifact into a feature matrix and target.
pub mod pipeline;
/// Casting, feature derivation, filtering, and bounded normalization.
pub mod preprocessing;
/// Bounded, seeded extraction of raw trips into a parquet sample.
pub mod sampler;
/// Parquet and CSV readers and the parquet artifact writer.
pub mod source;
/// Train/test split, model fit, and held-out scoring.
pub mod train;
/// Input transports used by sources (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{MissingColumnPolicy, SampleConfig, TrainConfig};
pub use errors::PipelineError;
pub use metrics::RegressionMetrics;
pub use model::{
    ForestConfig, MeanRegressor, ModelKind, RandomForestRegressor, Regressor, RidgeRegressor,
    StandardScaler,
};
pub use pipeline::{Dataset, Pipeline, TaxiDurationPipeline, require_columns};
pub use preprocessing::{
    FeatureBound, NormalizationBounds, normalize, parse_timestamp, part_of_day, preprocess_data,
};
pub use sampler::{SampleReport, make_smoke_sample};
pub use train::{TrainReport, TrainTestSplit, run_training, train_test_split};
pub use types::{ColumnName, FeatureName, RowIndex};
