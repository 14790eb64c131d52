use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Regressor, check_width, no_training_rows, not_fitted};
use crate::constants::training::{FOREST_ESTIMATORS, FOREST_MAX_DEPTH, FOREST_SEED};
use crate::errors::PipelineError;
use crate::pipeline::Dataset;

/// Smallest SSE reduction that justifies a split.
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Random forest configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree (the root is depth 0)
    pub max_depth: usize,
    /// Minimum rows a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Features tried per split (all of them if None)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Random seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: FOREST_ESTIMATORS,
            max_depth: FOREST_MAX_DEPTH,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: FOREST_SEED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One CART regression tree stored as a flat node arena; node 0 is the root.
#[derive(Clone, Debug, Default, PartialEq)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Split {
    feature: usize,
    threshold: f64,
    sse: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    config: &'a ForestConfig,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(mut self, rows: Vec<usize>) -> RegressionTree {
        self.grow(rows, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let value = rows.iter().map(|&r| self.y[r]).sum::<f64>() / rows.len() as f64;
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value });

        if depth >= self.config.max_depth
            || rows.len() < self.config.min_samples_split.max(2)
            || rows.len() < 2 * self.config.min_samples_leaf.max(1)
        {
            return slot;
        }
        let Some(split) = self.best_split(&rows) else {
            return slot;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.x[[r, split.feature]] <= split.threshold);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    /// Scan sorted values of each candidate feature with running sums and keep
    /// the midpoint threshold with the lowest summed squared error.
    fn best_split(&mut self, rows: &[usize]) -> Option<Split> {
        let width = self.x.ncols();
        let mut features: Vec<usize> = (0..width).collect();
        if let Some(limit) = self.config.max_features.filter(|&limit| limit < width) {
            features.shuffle(&mut self.rng);
            features.truncate(limit.max(1));
        }

        let n = rows.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total: f64 = rows.iter().map(|&r| self.y[r]).sum();
        let total_sq: f64 = rows.iter().map(|&r| self.y[r] * self.y[r]).sum();
        let parent_sse = total_sq - total * total / n as f64;

        let mut best: Option<Split> = None;
        let mut order = rows.to_vec();
        for feature in features {
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));
            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for pos in 0..n - 1 {
                let y = self.y[order[pos]];
                left_sum += y;
                left_sq += y * y;

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let here = self.x[[order[pos], feature]];
                let next = self.x[[order[pos + 1], feature]];
                if here >= next {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);
                let bar = best.map_or(parent_sse - MIN_SPLIT_GAIN, |best| best.sse);
                if sse < bar {
                    best = Some(Split {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        sse,
                    });
                }
            }
        }
        best
    }
}

/// Averaged ensemble of bootstrapped regression trees.
///
/// Trees are grown one after another. Each draws its bootstrap rows from its
/// own `StdRng`, so a fixed seed reproduces the same forest.
#[derive(Clone, Debug, Default)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Trees grown by the last `fit`.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, data: &Dataset) -> Result<(), PipelineError> {
        let rows = data.rows();
        if rows == 0 {
            return Err(no_training_rows());
        }
        if self.config.n_estimators == 0 {
            return Err(PipelineError::Configuration(
                "a random forest needs at least one tree".to_string(),
            ));
        }
        let x = data.features.mapv(f64::from);
        let y = data.target.mapv(f64::from);

        self.trees = (0..self.config.n_estimators)
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = if self.config.bootstrap {
                    (0..rows).map(|_| rng.random_range(0..rows)).collect()
                } else {
                    (0..rows).collect()
                };
                TreeBuilder {
                    x: &x,
                    y: &y,
                    config: &self.config,
                    rng,
                    nodes: Vec::new(),
                }
                .build(sample)
            })
            .collect();
        self.n_features = data.n_features();
        debug!(
            "grew {} tree(s) with {} node(s) in total",
            self.trees.len(),
            self.trees.iter().map(|tree| tree.nodes.len()).sum::<usize>()
        );
        Ok(())
    }

    fn predict(&self, data: &Dataset) -> Result<Array1<f32>, PipelineError> {
        if self.trees.is_empty() {
            return Err(not_fitted());
        }
        check_width(self.n_features, data)?;
        let x = data.features.mapv(f64::from);
        let n_trees = self.trees.len() as f64;
        Ok(x.axis_iter(Axis(0))
            .map(|row| {
                let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                (total / n_trees) as f32
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::dataset;

    fn small_forest(seed: u64) -> RandomForestRegressor {
        RandomForestRegressor::new(ForestConfig {
            n_estimators: 12,
            max_depth: 4,
            seed,
            ..ForestConfig::default()
        })
    }

    fn step_rows() -> Vec<(f32, f32)> {
        (0..40)
            .map(|i| (i as f32 / 40.0, ((i * 7) % 40) as f32 / 40.0))
            .collect()
    }

    #[test]
    fn default_forest_grows_150_trees_of_depth_10() {
        let forest = RandomForestRegressor::default();
        let config = forest.config();
        assert_eq!(config.n_estimators, 150);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.seed, 42);
        assert!(config.bootstrap);
    }

    #[test]
    fn fixed_seed_reproduces_predictions() {
        let data = dataset(&step_rows(), |a, b| a * a + 0.3 * b);

        let mut first = small_forest(42);
        let mut second = small_forest(42);
        first.fit(&data).unwrap();
        second.fit(&data).unwrap();
        assert_eq!(first.n_trees(), 12);
        assert_eq!(first.predict(&data).unwrap(), second.predict(&data).unwrap());

        let mut reseeded = small_forest(7);
        reseeded.fit(&data).unwrap();
        assert_ne!(first.predict(&data).unwrap(), reseeded.predict(&data).unwrap());
    }

    #[test]
    fn forest_learns_a_step_function() {
        let data = dataset(&step_rows(), |a, _| if a > 0.5 { 1.0 } else { 0.0 });
        let mut forest = small_forest(42);
        forest.fit(&data).unwrap();

        let predictions = forest.predict(&data).unwrap();
        let mae = predictions
            .iter()
            .zip(&data.target)
            .map(|(p, y)| (p - y).abs())
            .sum::<f32>()
            / data.rows() as f32;
        assert!(mae < 0.1, "mae {mae}");
    }

    #[test]
    fn single_unsampled_tree_fits_training_rows_exactly() {
        let data = dataset(&step_rows(), |a, b| a - b);
        let mut tree = RandomForestRegressor::new(ForestConfig {
            n_estimators: 1,
            max_depth: 64,
            bootstrap: false,
            ..ForestConfig::default()
        });
        tree.fit(&data).unwrap();
        let predictions = tree.predict(&data).unwrap();
        for (pred, actual) in predictions.iter().zip(&data.target) {
            assert!((pred - actual).abs() < 1e-6, "{pred} vs {actual}");
        }
    }

    #[test]
    fn unfitted_or_mismatched_inputs_are_training_errors() {
        let data = dataset(&step_rows(), |a, _| a);
        let forest = small_forest(1);
        assert!(matches!(forest.predict(&data), Err(PipelineError::Training(_))));

        let empty = dataset(&[], |a, _| a);
        assert!(matches!(
            small_forest(1).fit(&empty),
            Err(PipelineError::Training(_))
        ));

        let mut forest = small_forest(1);
        forest.fit(&data).unwrap();
        let narrower = Dataset {
            feature_names: vec!["a".to_string()],
            features: data.features.slice(ndarray::s![.., ..1]).to_owned(),
            target: data.target.clone(),
        };
        assert!(matches!(
            forest.predict(&narrower),
            Err(PipelineError::Training(_))
        ));
    }
}
