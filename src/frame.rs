//! Small helpers over polars data frames shared by the sampler, the
//! transformer, and the pipeline.

use indexmap::IndexMap;
use polars::functions::concat_df_diagonal;
use polars::prelude::*;

use crate::errors::PipelineError;
use crate::types::ColumnName;

/// Column names of `frame`, in order.
pub fn column_names(frame: &DataFrame) -> Vec<ColumnName> {
    frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn contains(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}

/// Remove `name` when present.
pub fn drop_if_present(frame: &mut DataFrame, name: &str) -> Result<(), PipelineError> {
    if contains(frame, name) {
        frame.drop_in_place(name)?;
    }
    Ok(())
}

/// True for the integer and float dtypes.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Numeric cells widened to `f64`; nulls and NaN become `None`.
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>, PipelineError> {
    if !is_numeric(column.dtype()) {
        return Err(PipelineError::column_type(
            column.name(),
            format!("{} is not a numeric dtype", column.dtype()),
        ));
    }
    let widened = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(widened
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

/// Stack frames row-wise. Columns missing from a frame are null padded.
///
/// A column stored with different numeric dtypes across frames is widened to
/// `Float64` first; any other dtype conflict is a `ColumnType` error.
pub fn concat_padded(frames: Vec<DataFrame>) -> Result<DataFrame, PipelineError> {
    if frames.len() <= 1 {
        return Ok(frames.into_iter().next().unwrap_or_else(DataFrame::empty));
    }

    let mut dtypes: IndexMap<ColumnName, DataType> = IndexMap::new();
    for frame in &frames {
        for column in frame.get_columns() {
            let incoming = column.dtype();
            match dtypes.get_mut(column.name().as_str()) {
                None => {
                    dtypes.insert(column.name().to_string(), incoming.clone());
                }
                Some(current) if current == incoming => {}
                Some(current) if is_numeric(current) && is_numeric(incoming) => {
                    *current = DataType::Float64;
                }
                Some(current) => {
                    return Err(PipelineError::column_type(
                        column.name(),
                        format!("cannot combine {current} and {incoming} values"),
                    ));
                }
            }
        }
    }

    let mut aligned = Vec::with_capacity(frames.len());
    for mut frame in frames {
        for (name, dtype) in &dtypes {
            let recast = match frame.column(name) {
                Ok(column) if column.dtype() != dtype => Some(column.cast(dtype)?),
                _ => None,
            };
            if let Some(column) = recast {
                frame.with_column(column)?;
            }
        }
        aligned.push(frame);
    }
    Ok(concat_df_diagonal(&aligned)?)
}
