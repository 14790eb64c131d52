use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::columns::*;
use crate::errors::PipelineError;
use crate::types::FeatureName;

/// Inclusive domain of one feature.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureBound {
    pub min: f64,
    pub max: f64,
}

impl FeatureBound {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Linear map of `[min, max]` onto `[0, 1]`.
    pub fn rescale(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// Static per-feature `(min, max)` table used to filter and rescale rows.
///
/// The default holds hand-curated bounds for NYC taxi trips. Rows outside a
/// bound are dropped by normalization, so bounds tuned for one dataset era can
/// discard many rows of another; override them per deployment rather than
/// widening them implicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<FeatureName, FeatureBound>", into = "IndexMap<FeatureName, FeatureBound>")]
pub struct NormalizationBounds {
    bounds: IndexMap<FeatureName, FeatureBound>,
}

impl NormalizationBounds {
    /// An empty table; add entries with [`NormalizationBounds::with_bound`].
    pub fn empty() -> Self {
        Self {
            bounds: IndexMap::new(),
        }
    }

    /// Add or replace the bound for `feature`.
    pub fn with_bound(
        mut self,
        feature: impl Into<FeatureName>,
        min: f64,
        max: f64,
    ) -> Result<Self, PipelineError> {
        let feature = feature.into();
        validate(&feature, min, max)?;
        self.bounds.insert(feature, FeatureBound { min, max });
        Ok(self)
    }

    /// Layer `overrides` on top of `self`: listed features take the new bound,
    /// every other feature keeps its current one.
    pub fn with_overrides(mut self, overrides: NormalizationBounds) -> Self {
        self.bounds.extend(overrides.bounds);
        self
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureBound> {
        self.bounds.get(feature)
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Feature names in insertion order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.bounds.keys().map(String::as_str)
    }

    /// Parse `{"feature": {"min": .., "max": ..}, ..}`.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json)
            .map_err(|err| PipelineError::Configuration(format!("invalid bounds: {err}")))
    }

    /// Load bounds from a JSON file.
    pub fn from_json_path(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|err| PipelineError::NotFound {
            path: path.to_path_buf(),
            reason: format!("cannot read bounds file ({err})"),
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for NormalizationBounds {
    fn default() -> Self {
        let entries: [(&str, f64, f64); 20] = [
            (PASSENGER_COUNT, 0.0, 5.0),
            (TRIP_DISTANCE, 0.0, 50.0),
            (PICKUP_LONGITUDE, -74.2, -73.7),
            (PICKUP_LATITUDE, 40.5, 41.0),
            (RATE_CODE, 0.0, 10.0),
            (DROPOFF_LONGITUDE, -74.2, -73.7),
            (DROPOFF_LATITUDE, 40.5, 41.0),
            (FARE_AMOUNT, 0.0, 75.0),
            (SURCHARGE, 0.0, 2.0),
            (MTA_TAX, 0.0, 0.5),
            (TIP_AMOUNT, 0.0, 20.0),
            (TOLLS_AMOUNT, 0.0, 7.5),
            (TOTAL_AMOUNT, 0.0, 100.0),
            (TRIP_DURATION, 0.0, 7200.0),
            (PICKUP_YEAR, 2000.0, 2020.0),
            (PICKUP_MONTH, 1.0, 12.0),
            (PICKUP_DAY, 1.0, 31.0),
            (PICKUP_WEEKDAY, 0.0, 6.0),
            (PICKUP_HOUR, 0.0, 23.0),
            (PICKUP_PART_OF_DAY, 0.0, 3.0),
        ];
        Self {
            bounds: entries
                .into_iter()
                .map(|(feature, min, max)| (feature.to_string(), FeatureBound { min, max }))
                .collect(),
        }
    }
}

impl TryFrom<IndexMap<FeatureName, FeatureBound>> for NormalizationBounds {
    type Error = PipelineError;

    fn try_from(bounds: IndexMap<FeatureName, FeatureBound>) -> Result<Self, Self::Error> {
        for (feature, bound) in &bounds {
            validate(feature, bound.min, bound.max)?;
        }
        Ok(Self { bounds })
    }
}

impl From<NormalizationBounds> for IndexMap<FeatureName, FeatureBound> {
    fn from(value: NormalizationBounds) -> Self {
        value.bounds
    }
}

fn validate(feature: &str, min: f64, max: f64) -> Result<(), PipelineError> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(PipelineError::Configuration(format!(
            "bound for '{feature}' must be finite with min < max (got [{min}, {max}])"
        )));
    }
    Ok(())
}
