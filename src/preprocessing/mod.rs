//! Feature transformation from raw trip rows to a normalized, model-ready table.

/// Per-feature normalization bounds.
pub mod bounds;
/// Casting, derivation, filtering, and normalization steps.
pub mod transform;

pub use bounds::{FeatureBound, NormalizationBounds};
pub use transform::{normalize, parse_timestamp, part_of_day, preprocess_data};
