//! Value-dependent dtype narrowing for sample artifacts.

use polars::prelude::*;
use tracing::warn;

use crate::constants::sample::LOG_PREFIX;
use crate::errors::PipelineError;

/// Target width chosen for a 64-bit integer column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegerWidth {
    /// Unsigned 1-byte (`0..=255`).
    U8,
    /// Unsigned 2-byte (`0..=65535`).
    U16,
    /// Signed 4-byte fallback.
    I32,
}

impl IntegerWidth {
    pub fn dtype(self) -> DataType {
        match self {
            IntegerWidth::U8 => DataType::UInt8,
            IntegerWidth::U16 => DataType::UInt16,
            IntegerWidth::I32 => DataType::Int32,
        }
    }
}

/// Smallest width that holds every value in `min..=max`.
///
/// Unsigned widths are preferred; anything negative or above `u16::MAX` falls
/// back to a signed 4-byte integer.
pub fn narrowest_unsigned_type(min: i64, max: i64) -> IntegerWidth {
    if min >= 0 && max <= i64::from(u8::MAX) {
        IntegerWidth::U8
    } else if min >= 0 && max <= i64::from(u16::MAX) {
        IntegerWidth::U16
    } else {
        IntegerWidth::I32
    }
}

/// Narrow one column: `Float64 -> Float32`, `Int64 ->` the observed-range width.
///
/// Every other dtype is returned unchanged, so narrowing is idempotent. An
/// all-null `Int64` column narrows to `UInt8`; one whose range exceeds `i32`
/// stays `Int64`.
pub fn narrow_column(column: &Column) -> Result<Column, PipelineError> {
    match column.dtype() {
        DataType::Float64 => Ok(column.cast(&DataType::Float32)?),
        DataType::Int64 => {
            let values = column.as_materialized_series().i64()?;
            let (min, max) = values.min().zip(values.max()).unwrap_or((0, 0));
            let width = narrowest_unsigned_type(min, max);
            if width == IntegerWidth::I32
                && (min < i64::from(i32::MIN) || max > i64::from(i32::MAX))
            {
                warn!(
                    "{LOG_PREFIX} column '{}' range [{min}, {max}] exceeds int32; keeping int64",
                    column.name()
                );
                return Ok(column.clone());
            }
            Ok(column.cast(&width.dtype())?)
        }
        _ => Ok(column.clone()),
    }
}

/// Narrow every column of `frame`.
pub fn narrow_table(frame: &DataFrame) -> Result<DataFrame, PipelineError> {
    let columns = frame
        .get_columns()
        .iter()
        .map(narrow_column)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DataFrame::new(columns)?)
}
