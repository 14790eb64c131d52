use ndarray::Array1;
use serde::Serialize;

/// Held-out regression quality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Score `predicted` against `actual`.
    ///
    /// Returns `None` when the arrays are empty or differ in length.
    pub fn evaluate(actual: &Array1<f32>, predicted: &Array1<f32>) -> Option<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return None;
        }
        let actual = actual.mapv(f64::from);
        let predicted = predicted.mapv(f64::from);
        Some(Self {
            mae: mean_absolute_error(&actual, &predicted),
            rmse: root_mean_squared_error(&actual, &predicted),
            r2: r2_score(&actual, &predicted),
        })
    }
}

pub fn mean_absolute_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    (actual - predicted).mapv(f64::abs).mean().unwrap_or(0.0)
}

pub fn root_mean_squared_error(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    (actual - predicted)
        .mapv(|r| r * r)
        .mean()
        .unwrap_or(0.0)
        .sqrt()
}

/// Coefficient of determination. A constant target scores 0.
pub fn r2_score(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    let mean_actual = actual.mean().unwrap_or(0.0);
    let ss_tot = actual.mapv(|v| (v - mean_actual).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res = (actual - predicted).mapv(|r| r * r).sum();
    1.0 - ss_res / ss_tot
}
