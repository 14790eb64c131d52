//! Regressors for the trip-duration harness.

use clap::ValueEnum;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::training::DEFAULT_RIDGE_ALPHA;
use crate::errors::PipelineError;
use crate::pipeline::Dataset;

/// Bagged CART regression trees.
pub mod forest;
/// Standardized closed-form ridge regression.
pub mod linear;

pub use forest::{ForestConfig, RandomForestRegressor};
pub use linear::{RidgeRegressor, StandardScaler};

/// A model that can be fitted on a [`Dataset`] and score new rows.
pub trait Regressor {
    fn fit(&mut self, data: &Dataset) -> Result<(), PipelineError>;
    fn predict(&self, data: &Dataset) -> Result<Array1<f32>, PipelineError>;
}

/// Selectable model families.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Predict the training-target mean.
    Mean,
    /// L2-regularized linear regression on standardized features.
    Ridge,
    /// 150 bootstrapped trees of depth at most 10, seed 42.
    #[default]
    #[value(name = "random_forest", alias = "random-forest")]
    RandomForest,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Mean => "mean",
            ModelKind::Ridge => "ridge",
            ModelKind::RandomForest => "random_forest",
        }
    }

    pub fn build(self) -> Box<dyn Regressor> {
        match self {
            ModelKind::Mean => Box::new(MeanRegressor::default()),
            ModelKind::Ridge => Box::new(RidgeRegressor::new(DEFAULT_RIDGE_ALPHA)),
            ModelKind::RandomForest => Box::new(RandomForestRegressor::default()),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constant predictor.
#[derive(Clone, Debug, Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, data: &Dataset) -> Result<(), PipelineError> {
        self.mean = Some(
            data.target
                .mapv(f64::from)
                .mean()
                .ok_or_else(no_training_rows)?,
        );
        Ok(())
    }

    fn predict(&self, data: &Dataset) -> Result<Array1<f32>, PipelineError> {
        let mean = self.mean.ok_or_else(not_fitted)?;
        Ok(Array1::from_elem(data.rows(), mean as f32))
    }
}

pub(crate) fn not_fitted() -> PipelineError {
    PipelineError::Training("model is not fitted".to_string())
}

pub(crate) fn no_training_rows() -> PipelineError {
    PipelineError::Training("cannot fit on zero rows".to_string())
}

pub(crate) fn check_width(expected: usize, data: &Dataset) -> Result<(), PipelineError> {
    if data.n_features() != expected {
        return Err(PipelineError::Training(format!(
            "expected {expected} feature(s), got {}",
            data.n_features()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ndarray::{Array2, array};

    /// Two-feature dataset with the target computed from each row.
    pub(crate) fn dataset(rows: &[(f32, f32)], target: impl Fn(f32, f32) -> f32) -> Dataset {
        let features = Array2::from_shape_fn((rows.len(), 2), |(row, col)| {
            if col == 0 { rows[row].0 } else { rows[row].1 }
        });
        Dataset {
            feature_names: vec!["a".to_string(), "b".to_string()],
            features,
            target: rows.iter().map(|&(a, b)| target(a, b)).collect(),
        }
    }

    #[test]
    fn mean_regressor_predicts_the_training_mean() {
        let data = dataset(&[(0.0, 0.0), (1.0, 1.0)], |a, _| a);
        let mut model = MeanRegressor::default();
        assert!(model.predict(&data).is_err());
        model.fit(&data).unwrap();
        assert_eq!(model.predict(&data).unwrap(), array![0.5, 0.5]);

        let empty = dataset(&[], |a, _| a);
        assert!(matches!(
            MeanRegressor::default().fit(&empty),
            Err(PipelineError::Training(_))
        ));
    }

    #[test]
    fn model_kind_names_round_trip_through_clap() {
        assert_eq!(ModelKind::from_str("ridge", true), Ok(ModelKind::Ridge));
        assert_eq!(ModelKind::from_str("mean", true), Ok(ModelKind::Mean));
        assert_eq!(
            ModelKind::from_str("random_forest", true),
            Ok(ModelKind::RandomForest)
        );
        assert_eq!(ModelKind::default(), ModelKind::RandomForest);
        assert_eq!(ModelKind::default().to_string(), "random_forest");
        assert_eq!(
            serde_json::to_value(ModelKind::RandomForest).unwrap(),
            "random_forest"
        );
    }
}
