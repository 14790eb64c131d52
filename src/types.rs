/// Column name in a trip table.
/// Examples: `pickup_datetime`, `rate_code`, `trip_duration`
pub type ColumnName = String;
/// Name of a derived or raw model feature (a normalization bound key).
/// Examples: `trip_distance`, `pickup_part_of_day`
pub type FeatureName = String;
/// Row position within a table.
pub type RowIndex = usize;
