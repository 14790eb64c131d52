//! Adapters that turn a sample artifact into a model-ready [`Dataset`].

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use tracing::info;

use crate::config::TrainConfig;
use crate::constants::columns::{POST_REQUIRED, TARGET};
use crate::constants::training::{DEFAULT_PIPELINE, LOG_PREFIX};
use crate::errors::PipelineError;
use crate::frame::{column_names, contains, is_numeric};
use crate::preprocessing::preprocess_data;
use crate::source::read_table;
use crate::types::{FeatureName, RowIndex};

/// Feature matrix (one row per trip) plus regression target.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<FeatureName>,
    pub features: Array2<f32>,
    pub target: Array1<f32>,
}

impl Dataset {
    pub fn rows(&self) -> usize {
        self.target.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows at `indices`, in the given order.
    pub fn subset(&self, indices: &[RowIndex]) -> Dataset {
        Dataset {
            feature_names: self.feature_names.clone(),
            features: self.features.select(Axis(0), indices),
            target: self.target.select(Axis(0), indices),
        }
    }

    /// Split a normalized frame into features and `target`.
    ///
    /// Features follow `feature_order`; rows with a null in any used column are
    /// skipped.
    pub fn from_frame(
        frame: &DataFrame,
        feature_order: &[&str],
        target: &str,
    ) -> Result<Dataset, PipelineError> {
        let mut used = feature_order.to_vec();
        used.push(target);
        require_columns(frame, &used)?;

        let selected = frame.select(used.iter().copied())?;
        let mut complete = BooleanChunked::full("complete".into(), true, selected.height());
        for column in selected.get_columns() {
            if !is_numeric(column.dtype()) {
                return Err(PipelineError::column_type(
                    column.name(),
                    format!("{} is not a numeric feature", column.dtype()),
                ));
            }
            complete = &complete & &column.as_materialized_series().is_not_null();
        }
        let selected = selected.filter(&complete)?;

        let features = selected
            .select(feature_order.iter().copied())?
            .to_ndarray::<Float32Type>(IndexOrder::C)?;
        let target_values = selected
            .column(target)?
            .cast(&DataType::Float32)?
            .as_materialized_series()
            .f32()?
            .into_no_null_iter()
            .collect::<Array1<f32>>();
        Ok(Dataset {
            feature_names: feature_order.iter().map(|name| name.to_string()).collect(),
            features,
            target: target_values,
        })
    }
}

/// Fail with `SchemaMismatch` unless every `required` column is present.
pub fn require_columns(frame: &DataFrame, required: &[&str]) -> Result<(), PipelineError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !contains(frame, name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch {
            missing,
            present: column_names(frame),
        })
    }
}

/// A named way to load training data.
pub trait Pipeline {
    fn name(&self) -> &str;
    fn load_data(&self, config: &TrainConfig) -> Result<Dataset, PipelineError>;
}

/// Sample artifact -> feature transformer -> 19 features plus `trip_duration`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaxiDurationPipeline;

impl Pipeline for TaxiDurationPipeline {
    fn name(&self) -> &str {
        DEFAULT_PIPELINE
    }

    fn load_data(&self, config: &TrainConfig) -> Result<Dataset, PipelineError> {
        if !config.data_path.exists() {
            return Err(PipelineError::NotFound {
                path: config.data_path.clone(),
                reason: "sample data missing; run make_smoke_sample first".to_string(),
            });
        }
        let raw = read_table(&config.data_path, Some(config.rows))?;
        let raw_rows = raw.height();
        let features_frame = preprocess_data(raw, &config.bounds)?;
        require_columns(&features_frame, &POST_REQUIRED)?;

        let features: Vec<&str> = POST_REQUIRED
            .iter()
            .copied()
            .filter(|name| *name != TARGET)
            .collect();
        let dataset = Dataset::from_frame(&features_frame, &features, TARGET)?;
        info!(
            "{LOG_PREFIX} {} kept {} of {raw_rows} row(s) with {} feature(s)",
            self.name(),
            dataset.rows(),
            dataset.n_features()
        );
        Ok(dataset)
    }
}

/// Resolve a pipeline by name.
pub fn pipeline_by_name(name: &str) -> Result<Box<dyn Pipeline>, PipelineError> {
    match name {
        DEFAULT_PIPELINE => Ok(Box::new(TaxiDurationPipeline)),
        other => Err(PipelineError::Configuration(format!(
            "unknown pipeline '{other}' (available: {DEFAULT_PIPELINE})"
        ))),
    }
}
