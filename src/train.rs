//! Train/evaluate loop behind the `train` binary.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use crate::config::TrainConfig;
use crate::constants::training::LOG_PREFIX;
use crate::errors::PipelineError;
use crate::metrics::RegressionMetrics;
use crate::model::ModelKind;
use crate::pipeline::pipeline_by_name;
use crate::types::RowIndex;

/// Metrics line printed by the `train` binary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainReport {
    pub model: ModelKind,
    pub pipeline: String,
    /// Wall time of split, fit, predict, and scoring, rounded to 0.1 ms.
    pub duration_s: f64,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    /// Rows in the dataset before splitting.
    pub samples: usize,
    pub features: usize,
    pub test_size: f64,
}

/// Shuffled train/test row indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<RowIndex>,
    pub test: Vec<RowIndex>,
}

/// Shuffle `0..rows` with `seed` and hold out `ceil(rows * test_size)` rows.
pub fn train_test_split(
    rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::Configuration(format!(
            "test_size must be in (0, 1) (got {test_size})"
        )));
    }
    let n_test = (rows as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= rows {
        return Err(PipelineError::EmptyResult(format!(
            "{rows} row(s) cannot be split with test_size {test_size}"
        )));
    }
    let mut indices: Vec<RowIndex> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Load data through the configured pipeline, fit the configured model, and
/// score it on the held-out split.
pub fn run_training(config: &TrainConfig) -> Result<TrainReport, PipelineError> {
    let pipeline = pipeline_by_name(&config.pipeline)?;
    let dataset = pipeline.load_data(config)?;

    let started = Instant::now();
    let split = train_test_split(dataset.rows(), config.test_size, config.seed)?;
    let train = dataset.subset(&split.train);
    let test = dataset.subset(&split.test);

    let mut model = config.model.build();
    model.fit(&train)?;
    let predicted = model.predict(&test)?;
    let metrics = RegressionMetrics::evaluate(&test.target, &predicted).ok_or_else(|| {
        PipelineError::Training("prediction count does not match the test split".to_string())
    })?;
    let elapsed = started.elapsed().as_secs_f64();

    info!(
        "{LOG_PREFIX} {} on {}: {} train / {} test row(s), r2 {:.4}",
        config.model,
        pipeline.name(),
        train.rows(),
        test.rows(),
        metrics.r2
    );
    Ok(TrainReport {
        model: config.model,
        pipeline: pipeline.name().to_string(),
        duration_s: (elapsed * 10_000.0).round() / 10_000.0,
        mae: metrics.mae,
        rmse: metrics.rmse,
        r2: metrics.r2,
        samples: dataset.rows(),
        features: dataset.n_features(),
        test_size: config.test_size,
    })
}
