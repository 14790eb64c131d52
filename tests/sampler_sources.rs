mod common;

use std::fs;

use polars::prelude::*;
use tempfile::tempdir;
use trip_duration::constants::columns::*;
use trip_duration::frame::column_names;
use trip_duration::source::{read_table, write_parquet};
use trip_duration::{MissingColumnPolicy, PipelineError, SampleConfig, make_smoke_sample};

fn dtype_of(frame: &DataFrame, name: &str) -> DataType {
    frame.column(name).unwrap().dtype().clone()
}

#[test]
fn csv_only_directory_falls_back_to_csv() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("raw");
    fs::create_dir(&source).unwrap();
    common::write_raw_csv(&source.join("trips_2010.csv"), 40);
    fs::write(source.join("README.txt"), "not a table").unwrap();

    let out = temp.path().join("nested").join("sample.parquet");
    let report = make_smoke_sample(&SampleConfig {
        rows: 16,
        out: out.clone(),
        ..SampleConfig::new(&source)
    })
    .unwrap();

    assert_eq!(report.rows, 16);
    assert_eq!(report.columns, RAW_REQUIRED.len());
    assert!(report.missing_columns.is_empty());
    assert_eq!(report.bytes, fs::metadata(&out).unwrap().len());

    let sample = read_table(&out, None).unwrap();
    assert_eq!(sample.height(), 16);
    assert_eq!(column_names(&sample), RAW_REQUIRED.to_vec());
    assert!(sample.get_column_index("row_note").is_none());
    assert_eq!(dtype_of(&sample, PASSENGER_COUNT), DataType::UInt8);
    assert_eq!(dtype_of(&sample, RATE_CODE), DataType::UInt8);
    assert_eq!(dtype_of(&sample, TRIP_DISTANCE), DataType::Float32);
    assert_eq!(dtype_of(&sample, VENDOR_ID), DataType::String);
    assert_eq!(dtype_of(&sample, PICKUP_DATETIME), DataType::String);
}

#[test]
fn directories_without_tables_are_not_found() {
    let temp = tempdir().unwrap();
    let empty = make_smoke_sample(&SampleConfig::new(temp.path()));
    assert!(matches!(empty, Err(PipelineError::NotFound { .. })));

    fs::write(temp.path().join("notes.txt"), "nothing here").unwrap();
    let unrelated = make_smoke_sample(&SampleConfig::new(temp.path()));
    assert!(matches!(unrelated, Err(PipelineError::NotFound { .. })));

    let missing = make_smoke_sample(&SampleConfig::new(temp.path().join("gone")));
    assert!(matches!(missing, Err(PipelineError::NotFound { .. })));
}

#[test]
fn parquet_sample_is_reproducible_and_narrowed() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("raw");
    fs::create_dir(&source).unwrap();
    let trips = common::raw_trips(300);
    for part in 0..3 {
        write_parquet(
            &mut trips.slice(part * 100, 100),
            &source.join(format!("part-{part}.parquet")),
            Some(25),
        )
        .unwrap();
    }
    // CSV files next to parquet files are ignored.
    common::write_raw_csv(&source.join("extra.csv"), 5);

    let run = |seed: u64, name: &str| {
        let out = temp.path().join(name);
        make_smoke_sample(&SampleConfig {
            rows: 20,
            seed,
            out: out.clone(),
            ..SampleConfig::new(&source)
        })
        .unwrap();
        read_table(&out, None).unwrap()
    };
    let first = run(42, "a.parquet");
    let second = run(42, "b.parquet");
    let other = run(43, "c.parquet");

    assert_eq!(first.height(), 20);
    assert!(first.equals_missing(&second));
    assert!(!first.equals_missing(&other));
    assert_eq!(
        dtype_of(&first, PICKUP_DATETIME),
        DataType::Datetime(TimeUnit::Microseconds, None)
    );
    assert_eq!(dtype_of(&first, PASSENGER_COUNT), DataType::UInt8);
    assert_eq!(dtype_of(&first, FARE_AMOUNT), DataType::Float32);
}

#[test]
fn small_sources_are_kept_whole() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("trips.parquet");
    write_parquet(&mut common::raw_trips(10), &source, None).unwrap();

    let out = temp.path().join("sample.parquet");
    let report = make_smoke_sample(&SampleConfig {
        out: out.clone(),
        ..SampleConfig::new(&source)
    })
    .unwrap();
    assert_eq!(report.rows, 10);
    assert_eq!(
        report.to_string(),
        format!(
            "Wrote {} ({:.1} KB, 10 rows, 18 cols)",
            out.display(),
            report.bytes as f64 / 1024.0
        )
    );
}

#[test]
fn partial_schema_follows_the_missing_column_policy() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("partial.parquet");
    let mut trips = common::raw_trips(30)
        .select([PICKUP_DATETIME, DROPOFF_DATETIME, FARE_AMOUNT])
        .unwrap();
    write_parquet(&mut trips, &source, None).unwrap();

    let out = temp.path().join("sample.parquet");
    let report = make_smoke_sample(&SampleConfig {
        rows: 8,
        out: out.clone(),
        ..SampleConfig::new(&source)
    })
    .unwrap();
    assert_eq!(report.columns, 3);
    assert_eq!(report.missing_columns.len(), 15);
    assert!(report.missing_columns.contains(&VENDOR_ID.to_string()));

    let strict = make_smoke_sample(&SampleConfig {
        rows: 8,
        out: temp.path().join("strict.parquet"),
        missing_columns: MissingColumnPolicy::Strict,
        ..SampleConfig::new(&source)
    });
    assert!(matches!(strict, Err(PipelineError::PartialSchema { .. })));
}

#[test]
fn sources_without_required_columns_are_rejected() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("other.csv");
    fs::write(&source, "station,count\nA,1\nB,2\n").unwrap();
    let result = make_smoke_sample(&SampleConfig {
        out: temp.path().join("sample.parquet"),
        ..SampleConfig::new(&source)
    });
    assert!(matches!(result, Err(PipelineError::SchemaMismatch { .. })));
}

#[test]
fn header_only_csv_is_an_empty_result() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("empty.csv");
    fs::write(&source, "vendor_id,fare_amount\n").unwrap();
    let out_dir = temp.path().join("data");
    let result = make_smoke_sample(&SampleConfig {
        out: out_dir.join("sample.parquet"),
        ..SampleConfig::new(&source)
    });
    assert!(matches!(result, Err(PipelineError::EmptyResult(_))));
    assert!(!out_dir.exists());
}

#[test]
fn nanosecond_timestamps_survive_sampling() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("pandas.parquet");
    common::write_nanosecond_parquet(&source, 12);

    let out = temp.path().join("sample.parquet");
    let report = make_smoke_sample(&SampleConfig {
        rows: 6,
        out: out.clone(),
        ..SampleConfig::new(&source)
    })
    .unwrap();
    assert_eq!(report.rows, 6);
    assert_eq!(report.columns, 3);

    let sample = read_table(&out, None).unwrap();
    assert!(matches!(
        dtype_of(&sample, PICKUP_DATETIME),
        DataType::Datetime(TimeUnit::Nanoseconds, _)
    ));
    assert_eq!(dtype_of(&sample, FARE_AMOUNT), DataType::Float32);
}
