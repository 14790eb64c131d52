use ndarray::{Array1, Array2, Axis};

use super::{Regressor, check_width, no_training_rows, not_fitted};
use crate::constants::training::SINGULAR_PIVOT_EPSILON;
use crate::errors::PipelineError;
use crate::pipeline::Dataset;

/// Per-feature standardization fitted on training rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    /// Features with zero variance get scale 1 so they map to 0.
    pub fn fit(features: &Array2<f64>) -> Result<Self, PipelineError> {
        let means = features.mean_axis(Axis(0)).ok_or_else(no_training_rows)?;
        let scales = features
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 0.0 { std } else { 1.0 });
        Ok(Self { means, scales })
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        (features - &self.means) / &self.scales
    }
}

/// Ridge regression solved in closed form.
///
/// Features are standardized, the target is centered, and
/// `(XᵀX + αI) w = Xᵀ(y - ȳ)` is solved by Gaussian elimination with partial
/// pivoting. The intercept is the training-target mean.
#[derive(Clone, Debug)]
pub struct RidgeRegressor {
    alpha: f64,
    fitted: Option<RidgeFit>,
}

#[derive(Clone, Debug)]
struct RidgeFit {
    scaler: StandardScaler,
    weights: Array1<f64>,
    intercept: f64,
}

impl RidgeRegressor {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fitted: None,
        }
    }

    /// Fitted weights in standardized feature space.
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|fit| &fit.weights)
    }
}

impl Regressor for RidgeRegressor {
    fn fit(&mut self, data: &Dataset) -> Result<(), PipelineError> {
        if data.rows() == 0 {
            return Err(no_training_rows());
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(PipelineError::Configuration(format!(
                "ridge alpha must be finite and non-negative (got {})",
                self.alpha
            )));
        }
        let raw = data.features.mapv(f64::from);
        let scaler = StandardScaler::fit(&raw)?;
        let x = scaler.transform(&raw);

        let y = data.target.mapv(f64::from);
        let intercept = y.mean().ok_or_else(no_training_rows)?;
        let centered = &y - intercept;

        let gram = x.t().dot(&x) + Array2::<f64>::eye(data.n_features()) * self.alpha;
        let rhs = x.t().dot(&centered);
        let weights = solve_linear_system(gram, rhs)?;
        self.fitted = Some(RidgeFit {
            scaler,
            weights,
            intercept,
        });
        Ok(())
    }

    fn predict(&self, data: &Dataset) -> Result<Array1<f32>, PipelineError> {
        let fit = self.fitted.as_ref().ok_or_else(not_fitted)?;
        check_width(fit.weights.len(), data)?;
        let x = fit.scaler.transform(&data.features.mapv(f64::from));
        Ok((x.dot(&fit.weights) + fit.intercept).mapv(|v| v as f32))
    }
}

/// Solve `a x = b` for square `a` by Gaussian elimination with partial pivoting.
fn solve_linear_system(
    mut a: Array2<f64>,
    mut b: Array1<f64>,
) -> Result<Array1<f64>, PipelineError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r1, &r2| a[[r1, col]].abs().total_cmp(&a[[r2, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < SINGULAR_PIVOT_EPSILON {
            return Err(PipelineError::Training(format!(
                "singular system at column {col}; increase the ridge penalty"
            )));
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        let pivot_row = a.row(col).to_owned();
        for row in col + 1..n {
            let factor = a[[row, col]] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            a.row_mut(row).scaled_add(-factor, &pivot_row);
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}
