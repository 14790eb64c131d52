use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{MissingColumnPolicy, SampleConfig, TrainConfig};
use crate::constants::{sample, training};
use crate::model::ModelKind;
use crate::preprocessing::NormalizationBounds;
use crate::sampler::make_smoke_sample;
use crate::train::run_training;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MissingColumnsArg {
    Intersect,
    Strict,
}

impl From<MissingColumnsArg> for MissingColumnPolicy {
    fn from(value: MissingColumnsArg) -> Self {
        match value {
            MissingColumnsArg::Intersect => MissingColumnPolicy::Intersect,
            MissingColumnsArg::Strict => MissingColumnPolicy::Strict,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "make_smoke_sample",
    disable_help_subcommand = true,
    about = "Write a small, reproducible parquet sample of raw taxi trips",
    long_about = "Read a bounded number of rows from a parquet/CSV file or directory, downsample them with a fixed seed, keep the required raw trip columns, narrow numeric types, and write one snappy-compressed parquet file."
)]
struct MakeSmokeSampleCli {
    #[arg(long, value_name = "PATH", help = "Parquet/CSV file or a directory containing them")]
    source: PathBuf,
    #[arg(
        long,
        default_value_t = sample::DEFAULT_ROWS,
        value_parser = parse_positive_usize,
        help = "Number of rows to write"
    )]
    rows: usize,
    #[arg(long, value_name = "PATH", default_value = sample::DEFAULT_OUT, help = "Output parquet path")]
    out: PathBuf,
    #[arg(long, default_value_t = sample::DEFAULT_SEED, help = "Seed for the row downsample")]
    seed: u64,
    #[arg(
        long = "oversample-factor",
        default_value_t = sample::OVERSAMPLE_FACTOR,
        help = "Parquet rows read per requested row before downsampling"
    )]
    oversample_factor: usize,
    #[arg(
        long = "missing-columns",
        value_enum,
        default_value = "intersect",
        help = "Keep the available required columns, or fail when any is missing"
    )]
    missing_columns: MissingColumnsArg,
}

#[derive(Debug, Parser)]
#[command(
    name = "train",
    disable_help_subcommand = true,
    about = "Train and score a baseline trip-duration model",
    long_about = "Load the sample through a named pipeline, split it into train/test rows, fit the selected model, and print MAE, RMSE, and R2 as one JSON line.",
    after_help = "Every option except --bounds can also be set through the environment variable shown in brackets."
)]
struct TrainCli {
    #[arg(long, env = "MODEL", value_enum, default_value_t = ModelKind::RandomForest)]
    model: ModelKind,
    #[arg(long, env = "PIPELINE", default_value = training::DEFAULT_PIPELINE)]
    pipeline: String,
    #[arg(
        long,
        env = "ROWS",
        default_value_t = sample::DEFAULT_ROWS,
        value_parser = parse_positive_usize,
        help = "Rows read from the sample"
    )]
    rows: usize,
    #[arg(
        long = "test-size",
        env = "TEST_SIZE",
        default_value_t = training::DEFAULT_TEST_SIZE,
        help = "Held-out fraction in (0, 1)"
    )]
    test_size: f64,
    #[arg(long, env = "SEED", default_value_t = training::DEFAULT_SEED, help = "Seed for the train/test shuffle")]
    seed: u64,
    #[arg(
        long = "data-path",
        env = "DATA_PATH",
        value_name = "PATH",
        default_value = sample::DEFAULT_OUT,
        help = "Sample parquet file or directory"
    )]
    data_path: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON file overriding individual normalization bounds"
    )]
    bounds: Option<PathBuf>,
}

/// Run the `make_smoke_sample` CLI with `args_iter` (program name excluded).
pub fn run_make_smoke_sample<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();

    let Some(cli) = parse_cli::<MakeSmokeSampleCli, _>(
        std::iter::once("make_smoke_sample".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = SampleConfig {
        rows: cli.rows,
        out: cli.out,
        seed: cli.seed,
        oversample_factor: cli.oversample_factor,
        missing_columns: cli.missing_columns.into(),
        ..SampleConfig::new(cli.source)
    };
    let report = make_smoke_sample(&config)?;
    println!("{report}");
    Ok(())
}

/// Run the `train` CLI with `args_iter` (program name excluded).
pub fn run_train<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();

    let Some(cli) =
        parse_cli::<TrainCli, _>(std::iter::once("train".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let bounds = match &cli.bounds {
        Some(path) => {
            let overrides = NormalizationBounds::from_json_path(path)?;
            NormalizationBounds::default().with_overrides(overrides)
        }
        None => NormalizationBounds::default(),
    };
    let config = TrainConfig {
        model: cli.model,
        pipeline: cli.pipeline,
        rows: cli.rows,
        test_size: cli.test_size,
        seed: cli.seed,
        data_path: cli.data_path,
        bounds,
    };
    let report = run_training(&config)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn sample_cli_defaults() {
        let cli = parse_cli::<MakeSmokeSampleCli, _>(args(&["make_smoke_sample", "--source", "trips"]))
            .unwrap()
            .unwrap();
        assert_eq!(cli.source, PathBuf::from("trips"));
        assert_eq!(cli.rows, 256);
        assert_eq!(cli.seed, 0);
        assert_eq!(cli.out, PathBuf::from("data/smoke_sample.parquet"));
        assert!(matches!(cli.missing_columns, MissingColumnsArg::Intersect));
    }

    #[test]
    fn sample_cli_requires_source_and_positive_rows() {
        assert!(parse_cli::<MakeSmokeSampleCli, _>(args(&["make_smoke_sample"])).is_err());
        assert!(
            parse_cli::<MakeSmokeSampleCli, _>(args(&[
                "make_smoke_sample",
                "--source",
                "trips",
                "--rows",
                "0"
            ]))
            .is_err()
        );
    }

    #[test]
    fn help_is_not_an_error() {
        let parsed = parse_cli::<TrainCli, _>(args(&["train", "--help"])).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn train_cli_flags_override_defaults() {
        let cli = parse_cli::<TrainCli, _>(args(&[
            "train",
            "--model",
            "mean",
            "--test-size",
            "0.3",
            "--seed",
            "7",
            "--data-path",
            "elsewhere.parquet",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(cli.model, ModelKind::Mean);
        assert_eq!(cli.test_size, 0.3);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.data_path, PathBuf::from("elsewhere.parquet"));
        assert!(cli.bounds.is_none());
    }

    #[test]
    fn train_cli_defaults_to_the_random_forest() {
        let cli = parse_cli::<TrainCli, _>(args(&["train"])).unwrap().unwrap();
        assert_eq!(cli.model, ModelKind::RandomForest);
        let named = parse_cli::<TrainCli, _>(args(&["train", "--model", "random_forest"]))
            .unwrap()
            .unwrap();
        assert_eq!(named.model, ModelKind::RandomForest);
    }
}
