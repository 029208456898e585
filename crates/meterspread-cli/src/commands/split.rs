//! Split command: turn two meter readings into hourly usage.

use chrono::{Local, Timelike};
use clap::Args;

use meterspread_core::report::{render_ascii_chart, render_table};
use meterspread_core::{
    Config, Database, DistributionRequest, DistributionSummary, KvWeightMemory, NoMemory,
    UsageDistributor, UsageProfile,
};

#[derive(Args)]
pub struct SplitArgs {
    /// Meter reading at the start of the period
    #[arg(long)]
    start: f64,
    /// Meter reading at the end of the period
    #[arg(long)]
    end: f64,
    /// Number of hourly buckets (default from config)
    #[arg(long)]
    buckets: Option<usize>,
    /// Hour of day of the first bucket, 0-23 (default: current hour)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..24))]
    start_hour: Option<u8>,
    /// Usage profile: residential, commercial or flat
    #[arg(long)]
    profile: Option<UsageProfile>,
    /// Decimal digits in the output (default from config)
    #[arg(long)]
    precision: Option<u32>,
    /// Seed for a reproducible split
    #[arg(long)]
    seed: Option<u64>,
    /// Neither read nor update the learned hourly bias
    #[arg(long)]
    no_memory: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
    /// Append an ASCII bar chart
    #[arg(long)]
    chart: bool,
}

pub fn run(args: SplitArgs) -> meterspread_core::error::Result<()> {
    let config = Config::load_or_default();

    let request = DistributionRequest::new(
        args.start,
        args.end,
        args.buckets.unwrap_or(config.defaults.bucket_count),
    )
    .with_start_offset(args.start_hour.unwrap_or_else(|| Local::now().hour() as u8))
    .with_profile(args.profile.unwrap_or(config.defaults.profile))
    .with_precision(args.precision.unwrap_or(config.defaults.precision));

    let mut engine_config = config.engine.clone();
    if args.seed.is_some() {
        engine_config.seed = args.seed;
    }
    let engine = UsageDistributor::with_config(engine_config);

    let use_memory = config.memory.enabled && !args.no_memory;
    let db = if use_memory {
        match Database::open() {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!(error = %e, "weight memory unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let results = match &db {
        Some(db) => {
            let mut memory = KvWeightMemory::new(db);
            engine.distribute_checked(&request, &mut memory)?
        }
        None => engine.distribute_checked(&request, &mut NoMemory)?,
    };

    if args.json {
        let output = serde_json::json!({
            "request": request,
            "results": results,
            "summary": DistributionSummary::from_results(&results),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", render_table(&results, request.total_target(), request.precision));
    if args.chart {
        print!("{}", render_ascii_chart(&results, request.precision));
    }
    Ok(())
}
