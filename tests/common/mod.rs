#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use parquet::data_type::{DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use polars::prelude::*;
use trip_duration::constants::columns::*;

pub const RATE_CODES: [i64; 4] = [0, 1, 2, 99];

pub fn pickup(i: usize) -> NaiveDateTime {
    let start = NaiveDate::from_ymd_opt(2010, 1, 4)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap();
    start + TimeDelta::minutes(7 * i as i64)
}

pub fn dropoff(i: usize) -> NaiveDateTime {
    pickup(i) + TimeDelta::seconds(120 + (i as i64 * 37) % 1800)
}

fn timestamps(name: &str, rows: usize, at: fn(usize) -> NaiveDateTime) -> Column {
    let micros: Vec<i64> = (0..rows)
        .map(|i| at(i).and_utc().timestamp_micros())
        .collect();
    Int64Chunked::from_vec(name.into(), micros)
        .into_datetime(TimeUnit::Microseconds, None)
        .into_series()
        .into_column()
}

/// `rows` plausible raw trips, every one inside the default normalization bounds.
pub fn raw_trips(rows: usize) -> DataFrame {
    let idx: Vec<usize> = (0..rows).collect();
    let floats = |map: &dyn Fn(usize) -> f64| -> Vec<f64> { idx.iter().map(|&i| map(i)).collect() };
    let fare = |i: usize| 2.5 + (i % 30) as f64;
    let tip = |i: usize| (i % 5) as f64;

    let mut frame = df!(
        VENDOR_ID => idx.iter().map(|&i| ["VTS", "CMT", "DDS"][i % 3]).collect::<Vec<_>>(),
        PASSENGER_COUNT => idx.iter().map(|&i| 1 + (i % 5) as i64).collect::<Vec<_>>(),
        TRIP_DISTANCE => floats(&|i| 0.1 + (i % 40) as f64 * 0.5),
        PICKUP_LONGITUDE => floats(&|i| -73.98 + (i % 10) as f64 * 0.002),
        PICKUP_LATITUDE => floats(&|i| 40.75 + (i % 10) as f64 * 0.001),
        RATE_CODE => idx.iter().map(|&i| RATE_CODES[i % 4]).collect::<Vec<_>>(),
        STORE_AND_FWD_FLAG => idx.iter().map(|_| "N").collect::<Vec<_>>(),
        DROPOFF_LONGITUDE => floats(&|i| -73.95 - (i % 7) as f64 * 0.003),
        DROPOFF_LATITUDE => floats(&|i| 40.72 + (i % 7) as f64 * 0.002),
        PAYMENT_TYPE => idx.iter().map(|&i| ["CASH", "CRD"][i % 2]).collect::<Vec<_>>(),
        FARE_AMOUNT => floats(&fare),
        SURCHARGE => floats(&|_| 0.5),
        MTA_TAX => floats(&|_| 0.5),
        TIP_AMOUNT => floats(&tip),
        TOLLS_AMOUNT => floats(&|_| 0.0),
        TOTAL_AMOUNT => floats(&|i| fare(i) + 1.0 + tip(i)),
    )
    .unwrap();
    frame
        .insert_column(1, timestamps(PICKUP_DATETIME, rows, pickup))
        .unwrap();
    frame
        .insert_column(2, timestamps(DROPOFF_DATETIME, rows, dropoff))
        .unwrap();
    frame
}

/// Same trips as [`raw_trips`], written as CSV text with an extra unrelated column.
pub fn write_raw_csv(path: &Path, rows: usize) {
    let mut frame = raw_trips(rows);
    let notes: Vec<String> = (0..rows).map(|row| format!("note {row}")).collect();
    frame
        .with_column(Series::new("row_note".into(), notes))
        .unwrap();
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(Some("%Y-%m-%d %H:%M:%S".to_string()))
        .finish(&mut frame)
        .unwrap();
}

/// Pickup/dropoff pairs stored as `INT64 TIMESTAMP(NANOS)`, the layout pandas
/// writes by default, plus a fare column.
pub fn write_nanosecond_parquet(path: &Path, rows: usize) {
    let schema = Arc::new(
        parse_message_type(
            "message trips {
                REQUIRED INT64 pickup_datetime (TIMESTAMP(NANOS,false));
                REQUIRED INT64 dropoff_datetime (TIMESTAMP(NANOS,false));
                REQUIRED DOUBLE fare_amount;
            }",
        )
        .unwrap(),
    );
    let nanos = |at: fn(usize) -> NaiveDateTime| -> Vec<i64> {
        (0..rows)
            .map(|i| at(i).and_utc().timestamp_nanos_opt().unwrap())
            .collect()
    };
    let fares: Vec<f64> = (0..rows).map(|i| 2.5 + (i % 30) as f64).collect();

    let file = File::create(path).unwrap();
    let props = Arc::new(WriterProperties::builder().build());
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    let mut group = writer.next_row_group().unwrap();
    for values in [nanos(pickup), nanos(dropoff)] {
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<Int64Type>()
            .write_batch(&values, None, None)
            .unwrap();
        column.close().unwrap();
    }
    let mut column = group.next_column().unwrap().unwrap();
    column
        .typed::<DoubleType>()
        .write_batch(&fares, None, None)
        .unwrap();
    column.close().unwrap();
    group.close().unwrap();
    writer.close().unwrap();
}
