/// Canonical column names for raw and derived trip fields.
pub mod columns {
    pub const VENDOR_ID: &str = "vendor_id";
    pub const PICKUP_DATETIME: &str = "pickup_datetime";
    pub const DROPOFF_DATETIME: &str = "dropoff_datetime";
    pub const PASSENGER_COUNT: &str = "passenger_count";
    pub const TRIP_DISTANCE: &str = "trip_distance";
    pub const PICKUP_LONGITUDE: &str = "pickup_longitude";
    pub const PICKUP_LATITUDE: &str = "pickup_latitude";
    pub const RATE_CODE: &str = "rate_code";
    pub const DROPOFF_LONGITUDE: &str = "dropoff_longitude";
    pub const DROPOFF_LATITUDE: &str = "dropoff_latitude";
    pub const FARE_AMOUNT: &str = "fare_amount";
    pub const SURCHARGE: &str = "surcharge";
    pub const MTA_TAX: &str = "mta_tax";
    pub const TIP_AMOUNT: &str = "tip_amount";
    pub const TOLLS_AMOUNT: &str = "tolls_amount";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const STORE_AND_FWD_FLAG: &str = "store_and_fwd_flag";
    pub const PAYMENT_TYPE: &str = "payment_type";

    pub const TRIP_DURATION: &str = "trip_duration";
    pub const PICKUP_YEAR: &str = "pickup_year";
    pub const PICKUP_MONTH: &str = "pickup_month";
    pub const PICKUP_DAY: &str = "pickup_day";
    pub const PICKUP_WEEKDAY: &str = "pickup_weekday";
    pub const PICKUP_HOUR: &str = "pickup_hour";
    pub const PICKUP_PART_OF_DAY: &str = "pickup_part_of_day";

    /// Raw fields kept in a sample artifact, in output order.
    pub const RAW_REQUIRED: [&str; 18] = [
        VENDOR_ID,
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
        PASSENGER_COUNT,
        TRIP_DISTANCE,
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        RATE_CODE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
        FARE_AMOUNT,
        SURCHARGE,
        MTA_TAX,
        TIP_AMOUNT,
        TOLLS_AMOUNT,
        TOTAL_AMOUNT,
        STORE_AND_FWD_FLAG,
        PAYMENT_TYPE,
    ];

    /// Columns the preprocessing output must contain for the training pipeline.
    pub const POST_REQUIRED: [&str; 20] = [
        PASSENGER_COUNT,
        TRIP_DISTANCE,
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        RATE_CODE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
        FARE_AMOUNT,
        SURCHARGE,
        MTA_TAX,
        TIP_AMOUNT,
        TOLLS_AMOUNT,
        TOTAL_AMOUNT,
        TRIP_DURATION,
        PICKUP_YEAR,
        PICKUP_MONTH,
        PICKUP_DAY,
        PICKUP_WEEKDAY,
        PICKUP_HOUR,
        PICKUP_PART_OF_DAY,
    ];

    /// Regression target split off by the pipeline.
    pub const TARGET: &str = TRIP_DURATION;
}

/// Constants used by the sample extractor.
pub mod sample {
    /// Default number of rows kept in a sample artifact.
    pub const DEFAULT_ROWS: usize = 256;
    /// Default sampling seed.
    pub const DEFAULT_SEED: u64 = 0;
    /// Default artifact location, relative to the working directory.
    pub const DEFAULT_OUT: &str = "data/smoke_sample.parquet";
    /// Rows read per requested row before downsampling parquet sources.
    pub const OVERSAMPLE_FACTOR: usize = 3;
    /// Columnar source extension, preferred when scanning a directory.
    pub const PARQUET_EXTENSION: &str = "parquet";
    /// Row-oriented source extension used as a directory fallback.
    pub const CSV_EXTENSION: &str = "csv";
    /// Log prefix for sampler events.
    pub const LOG_PREFIX: &str = "[trip_duration:sample]";
}

/// Constants used by the feature transformer.
pub mod preprocessing {
    use super::columns::*;

    /// Raw numeric columns narrowed to `f32` before feature derivation.
    pub const FLOAT32_COLUMNS: [&str; 11] = [
        TRIP_DISTANCE,
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
        FARE_AMOUNT,
        SURCHARGE,
        MTA_TAX,
        TIP_AMOUNT,
        TOLLS_AMOUNT,
        TOTAL_AMOUNT,
    ];

    /// Columns removed once their numeric equivalents exist.
    pub const DROPPED_AFTER_DERIVATION: [&str; 4] = [
        STORE_AND_FWD_FLAG,
        PAYMENT_TYPE,
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
    ];

    /// Largest rate code kept as its own category; anything else maps to 0.
    pub const MAX_RATE_CODE: i64 = 10;
    /// Rate code assigned to unknown or out-of-domain values.
    pub const UNKNOWN_RATE_CODE: u8 = 0;

    /// Hour where the morning bucket starts.
    pub const MORNING_START_HOUR: u32 = 6;
    /// Hour where the midday bucket starts.
    pub const MIDDAY_START_HOUR: u32 = 12;
    /// Hour where the evening bucket starts.
    pub const EVENING_START_HOUR: u32 = 16;
    /// Hour where the night bucket starts (wrapping to `MORNING_START_HOUR`).
    pub const NIGHT_START_HOUR: u32 = 22;

    /// Text timestamp layouts accepted when parsing pickup/dropoff columns.
    pub const TIMESTAMP_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
    ];
}

/// Constants used by the training harness.
pub mod training {
    /// Default name reported for the taxi duration pipeline.
    pub const DEFAULT_PIPELINE: &str = "pipeline_taxi_duration";
    /// Default held-out fraction.
    pub const DEFAULT_TEST_SIZE: f64 = 0.2;
    /// Default split seed.
    pub const DEFAULT_SEED: u64 = 123;
    /// Default ridge regularization strength.
    pub const DEFAULT_RIDGE_ALPHA: f64 = 1.0;
    /// Pivot magnitude under which a linear system is treated as singular.
    pub const SINGULAR_PIVOT_EPSILON: f64 = 1e-12;
    /// Trees in the default random forest.
    pub const FOREST_ESTIMATORS: usize = 150;
    /// Depth limit of each forest tree.
    pub const FOREST_MAX_DEPTH: usize = 10;
    /// Forest bootstrap seed.
    pub const FOREST_SEED: u64 = 42;
    /// Log prefix for training events.
    pub const LOG_PREFIX: &str = "[trip_duration:train]";
}
