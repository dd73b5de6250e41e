//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments into aggregation configs
//! - fetches series / loads tables
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, HistoricalArgs, SourceArgs, SumArgs, TermArgs, WindowedArgs};
use crate::data::HttpProvider;
use crate::domain::{Coordinate, HistoricalConfig, TermConfig, TermRequest, WindowConfig};
use crate::error::TermError;

/// Entry point for the `cterm` binary.
pub fn run() -> Result<(), TermError> {
    // Load `.env` before clap reads `env = ...` defaults.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Sum(args) => handle_sum(args),
        Command::Historical(args) => handle_historical(args),
        Command::Windowed(args) => handle_windowed(args),
    }
}

/// Log to stderr; stdout carries the report.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_sum(args: SumArgs) -> Result<(), TermError> {
    let provider = provider_from_args(&args.source)?;
    let request = term_request_from_args(&args.source, &args.term);
    let config = term_config_from_args(&args.term);

    let summary = crate::aggregate::sum_term(&provider, &request, &config)?;
    println!("{}", crate::report::format_term_summary(&request, &summary));
    Ok(())
}

fn handle_historical(args: HistoricalArgs) -> Result<(), TermError> {
    let provider = provider_from_args(&args.source)?;
    let request = term_request_from_args(&args.source, &args.term);
    let config = historical_config_from_args(&args);

    let result = crate::aggregate::build_historical(&provider, &request, &config)?;
    println!("{}", crate::report::format_historical(&request, &result));

    if let Some(path) = &args.export {
        crate::io::write_historical_csv(path, &result)?;
    }
    Ok(())
}

fn handle_windowed(args: WindowedArgs) -> Result<(), TermError> {
    let ingested = crate::io::load_daily_table(&args.csv)?;
    for err in &ingested.row_errors {
        eprintln!("line {}: {}", err.line, err.message);
    }

    let config = WindowConfig {
        lookback_years: args.years,
        column: args.column.to_ascii_lowercase(),
        reducer: args.reducer,
        leap_day: args.leap_day,
    };
    let result = crate::aggregate::windowed_reduce(&ingested.table, args.start, args.end, &config)?;
    println!("{}", crate::report::format_windowed(&result, args.start, args.end));

    if let Some(path) = &args.export {
        crate::io::write_windowed_csv(path, &result)?;
    }
    Ok(())
}

fn provider_from_args(source: &SourceArgs) -> Result<HttpProvider, TermError> {
    match &source.gateway {
        Some(url) => Ok(HttpProvider::new(
            url.clone(),
            std::env::var("CLIMATE_GATEWAY_TOKEN").ok().filter(|t| !t.is_empty()),
        )),
        None => HttpProvider::from_env(),
    }
}

pub fn term_request_from_args(source: &SourceArgs, term: &TermArgs) -> TermRequest {
    TermRequest {
        coordinate: Coordinate::new(source.lat, source.lon),
        dataset: source.dataset.clone(),
        start: term.start,
        end: term.end,
    }
}

pub fn term_config_from_args(term: &TermArgs) -> TermConfig {
    TermConfig {
        daily_cap: term.cap,
        use_prelim: term.prelim || term.revision.is_some(),
        preferred_revision: term.revision.clone(),
    }
}

pub fn historical_config_from_args(args: &HistoricalArgs) -> HistoricalConfig {
    let term = term_config_from_args(&args.term);
    HistoricalConfig {
        start_year: args.start_year,
        end_year: args.end_year,
        daily_cap: term.daily_cap,
        use_prelim: term.use_prelim,
        preferred_revision: term.preferred_revision,
        leap_day: args.leap_day,
    }
}
