//! Command-line parsing for the term aggregation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{HISTORICAL_START_YEAR, LeapDayPolicy, Reducer};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cterm", version, about = "Calendar-term sums and averages of daily climate series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Total one term for a grid cell.
    Sum(SumArgs),
    /// Replay a term across historical years for a grid cell.
    Historical(HistoricalArgs),
    /// Reduce a column of a daily CSV table over lookback years.
    Windowed(WindowedArgs),
}

/// Which dataset and grid cell to read.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Latitude of the grid cell.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the grid cell.
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Dataset name on the gateway.
    #[arg(short = 'd', long)]
    pub dataset: String,

    /// Dataset gateway base URL.
    #[arg(long, env = "CLIMATE_GATEWAY_URL")]
    pub gateway: Option<String>,
}

/// Term and revision options shared by `sum` and `historical`.
#[derive(Debug, Args, Clone)]
pub struct TermArgs {
    /// First day of the term (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the term, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,

    /// Ceiling applied to each daily value before summing.
    #[arg(long)]
    pub cap: Option<f64>,

    /// Use preliminary revisions when final data does not reach the end date.
    #[arg(long)]
    pub prelim: bool,

    /// Revision to try before the authoritative one (implies --prelim).
    #[arg(long)]
    pub revision: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SumArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub term: TermArgs,
}

#[derive(Debug, Args, Clone)]
pub struct HistoricalArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub term: TermArgs,

    /// First year to include.
    #[arg(long, default_value_t = HISTORICAL_START_YEAR)]
    pub start_year: i32,

    /// Last year to include (defaults to the year of --start).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// How to project Feb 29 onto common years.
    #[arg(long, value_enum, default_value_t = LeapDayPolicy::ClampToFeb28)]
    pub leap_day: LeapDayPolicy,

    /// Export per-year totals to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct WindowedArgs {
    /// Daily CSV table with a `date` column.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Column to reduce.
    #[arg(short = 'c', long)]
    pub column: String,

    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the period, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,

    /// Number of years before the period's start year to evaluate.
    #[arg(short = 'y', long, default_value_t = 10)]
    pub years: u32,

    /// Reduction applied to each year's window.
    #[arg(long, value_enum, default_value_t = Reducer::Sum)]
    pub reducer: Reducer,

    /// How to project Feb 29 onto common years.
    #[arg(long, value_enum, default_value_t = LeapDayPolicy::ClampToFeb28)]
    pub leap_day: LeapDayPolicy,

    /// Export rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
