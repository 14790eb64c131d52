use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use polars::prelude::*;
use tracing::debug;

use super::bounds::NormalizationBounds;
use crate::constants::columns::*;
use crate::constants::preprocessing::{
    DROPPED_AFTER_DERIVATION, EVENING_START_HOUR, FLOAT32_COLUMNS, MAX_RATE_CODE,
    MIDDAY_START_HOUR, MORNING_START_HOUR, NIGHT_START_HOUR, TIMESTAMP_FORMATS,
    UNKNOWN_RATE_CODE,
};
use crate::errors::PipelineError;
use crate::frame::{drop_if_present, is_numeric, numeric_values};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Bucket an hour of day: morning 0, midday 1, evening 2, night 3.
pub fn part_of_day(hour: u32) -> u8 {
    if (MORNING_START_HOUR..MIDDAY_START_HOUR).contains(&hour) {
        0
    } else if (MIDDAY_START_HOUR..EVENING_START_HOUR).contains(&hour) {
        1
    } else if (EVENING_START_HOUR..NIGHT_START_HOUR).contains(&hour) {
        2
    } else {
        3
    }
}

/// Parse a text timestamp with the accepted layouts, then RFC 3339 (offsets
/// are folded into UTC).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|ts| ts.naive_utc())
        })
}

/// Turn raw trip rows into the normalized feature frame.
///
/// Steps run in order on whatever columns are present: canonical casts, drop
/// `vendor_id`, derive pickup calendar features, derive `trip_duration` and
/// drop rows where it is not positive, collapse rate codes outside `0..=10`
/// to 0, drop text/timestamp columns, then [`normalize`].
pub fn preprocess_data(
    frame: DataFrame,
    bounds: &NormalizationBounds,
) -> Result<DataFrame, PipelineError> {
    let mut frame = frame;
    let input_rows = frame.height();

    apply_canonical_casts(&mut frame)?;
    drop_if_present(&mut frame, VENDOR_ID)?;

    let pickups = frame.column(PICKUP_DATETIME).ok().map(timestamps).transpose()?;
    if let Some(pickups) = &pickups {
        for series in calendar_columns(pickups) {
            frame.with_column(series)?;
        }
    }

    let dropoffs = frame.column(DROPOFF_DATETIME).ok().map(timestamps).transpose()?;
    if let (Some(pickups), Some(dropoffs)) = (&pickups, &dropoffs) {
        let durations = trip_durations(pickups, dropoffs);
        let keep: Vec<bool> = durations
            .iter()
            .map(|duration| duration.is_some_and(|seconds| seconds > 0.0))
            .collect();
        frame.with_column(Series::new(TRIP_DURATION.into(), durations))?;
        frame = frame.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        debug!(
            "dropped {} row(s) with non-positive trip duration",
            input_rows - frame.height()
        );
    }

    let clamped = frame.column(RATE_CODE).ok().map(clamp_rate_codes).transpose()?;
    if let Some(clamped) = clamped {
        frame.with_column(clamped)?;
    }

    for column in DROPPED_AFTER_DERIVATION {
        drop_if_present(&mut frame, column)?;
    }

    normalize(&frame, bounds)
}

/// Drop rows with any value outside its bound, then rescale every column to
/// `[0, 1]` as `Float32`.
///
/// Out-of-bound and null cells remove the whole row; nothing is clipped. Every
/// column needs a bound and a numeric dtype.
pub fn normalize(
    frame: &DataFrame,
    bounds: &NormalizationBounds,
) -> Result<DataFrame, PipelineError> {
    let mut keep = vec![true; frame.height()];
    let mut scaled = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let bound = bounds.get(column.name()).ok_or_else(|| {
            PipelineError::Configuration(format!(
                "no normalization bound for column '{}'",
                column.name()
            ))
        })?;
        if !is_numeric(column.dtype()) {
            return Err(PipelineError::column_type(
                column.name(),
                format!("{} columns cannot be normalized", column.dtype()),
            ));
        }
        let values = numeric_values(column)?;
        for (row, value) in values.iter().enumerate() {
            if !value.is_some_and(|v| bound.contains(v)) {
                keep[row] = false;
            }
        }
        scaled.push((column.name().clone(), *bound, values));
    }

    let kept = keep.iter().filter(|keep| **keep).count();
    debug!("normalization kept {kept} of {} row(s)", frame.height());
    let columns = scaled
        .into_iter()
        .map(|(name, bound, values)| {
            let data: Vec<f32> = values
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .filter_map(|(value, _)| value.map(|v| bound.rescale(v) as f32))
                .collect();
            Series::new(name, data).into_column()
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn apply_canonical_casts(frame: &mut DataFrame) -> Result<(), PipelineError> {
    let casts = std::iter::once((PASSENGER_COUNT, DataType::UInt8))
        .chain(FLOAT32_COLUMNS.into_iter().map(|name| (name, DataType::Float32)));
    for (name, dtype) in casts {
        let cast = frame
            .column(name)
            .ok()
            .map(|column| cast_numeric(column, &dtype))
            .transpose()?;
        if let Some(cast) = cast {
            frame.with_column(cast)?;
        }
    }
    Ok(())
}

/// Numeric sources cast leniently (overflow becomes null); text must parse in full.
fn cast_numeric(column: &Column, dtype: &DataType) -> Result<Series, PipelineError> {
    let series = column.as_materialized_series();
    match series.dtype() {
        source if is_numeric(source) => Ok(series.cast(dtype)?),
        DataType::String => series
            .strict_cast(dtype)
            .map_err(|err| PipelineError::column_type(column.name(), err.to_string())),
        source => Err(PipelineError::column_type(
            column.name(),
            format!("cannot cast {source} to {dtype}"),
        )),
    }
}

/// Timestamps of any time unit, dates, or text in an accepted layout.
fn timestamps(column: &Column) -> Result<Vec<Option<NaiveDateTime>>, PipelineError> {
    match column.dtype() {
        DataType::Datetime(_, _) | DataType::Date => {
            let micros = column
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
                .cast(&DataType::Int64)?;
            Ok(micros
                .as_materialized_series()
                .i64()?
                .into_iter()
                .map(|us| us.and_then(DateTime::from_timestamp_micros))
                .map(|ts| ts.map(|ts| ts.naive_utc()))
                .collect())
        }
        DataType::String => column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|text| match text {
                None => Ok(None),
                Some(text) => parse_timestamp(text).map(Some).ok_or_else(|| {
                    PipelineError::column_type(
                        column.name(),
                        format!("unparseable timestamp '{text}'"),
                    )
                }),
            })
            .collect(),
        other => Err(PipelineError::column_type(
            column.name(),
            format!("cannot cast {other} to timestamp"),
        )),
    }
}

fn calendar_columns(pickups: &[Option<NaiveDateTime>]) -> Vec<Series> {
    let derive = |name: &str, f: fn(&NaiveDateTime) -> u8| -> Series {
        let values: Vec<Option<u8>> = pickups.iter().map(|ts| ts.as_ref().map(f)).collect();
        Series::new(name.into(), values)
    };
    let years: Vec<Option<u16>> = pickups
        .iter()
        .map(|ts| ts.map(|ts| ts.year() as u16))
        .collect();
    vec![
        Series::new(PICKUP_YEAR.into(), years),
        derive(PICKUP_MONTH, |ts| ts.month() as u8),
        derive(PICKUP_DAY, |ts| ts.day() as u8),
        derive(PICKUP_WEEKDAY, |ts| ts.weekday().num_days_from_monday() as u8),
        derive(PICKUP_HOUR, |ts| ts.hour() as u8),
        derive(PICKUP_PART_OF_DAY, |ts| part_of_day(ts.hour())),
    ]
}

fn trip_durations(
    pickups: &[Option<NaiveDateTime>],
    dropoffs: &[Option<NaiveDateTime>],
) -> Vec<Option<f32>> {
    pickups
        .iter()
        .zip(dropoffs)
        .map(|(pickup, dropoff)| {
            let elapsed = (*dropoff)? - (*pickup)?;
            elapsed
                .num_microseconds()
                .map(|micros| (micros as f64 / MICROS_PER_SECOND) as f32)
        })
        .collect()
}

fn clamp_rate_codes(column: &Column) -> Result<Series, PipelineError> {
    let codes: Vec<Option<f64>> = match column.dtype() {
        DataType::String => column
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|text| text.and_then(|text| text.trim().parse().ok()))
            .collect(),
        dtype if is_numeric(dtype) => numeric_values(column)?,
        other => {
            return Err(PipelineError::column_type(
                column.name(),
                format!("{other} rate codes are not supported"),
            ));
        }
    };
    let max = MAX_RATE_CODE as f64;
    let clamped: Vec<u8> = codes
        .into_iter()
        .map(|code| match code.map(f64::trunc) {
            Some(code) if (0.0..=max).contains(&code) => code as u8,
            _ => UNKNOWN_RATE_CODE,
        })
        .collect();
    Ok(Series::new(RATE_CODE.into(), clamped))
}
