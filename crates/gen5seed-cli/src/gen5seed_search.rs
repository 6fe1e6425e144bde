//! Boot time / C-Gear seed search CLI
//!
//! Usage: gen5seed_search --profiles <file> --profile <name> --start <date> --end <date> [options]
//!
//! Example: gen5seed_search --profiles profiles.json --profile black \
//!     --start 2023-01-01 --end 2023-01-31 --method ivs --iv-min 31,31,31,31,31,31

mod common;

use chrono::NaiveDate;
use clap::Parser;
use common::{FilterArgs, GeneratorArgs, format_result, run_with_progress};
use gen5seed::infra::profile_io::load_profile;
use gen5seed::{Method, Protocol, SearchProgress, StationaryGenerator, StationarySearcher};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "gen5seed_search")]
#[command(about = "Search Gen 5 boot parameters whose outcomes match a filter", long_about = None)]
struct Args {
    /// Profile file (JSON array)
    #[arg(long)]
    profiles: PathBuf,

    /// Profile name
    #[arg(long)]
    profile: String,

    /// First boot date (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last boot date (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Minimum delay (C-Gear method only)
    #[arg(long, default_value_t = 0)]
    min_delay: u32,

    /// Maximum delay (C-Gear method only)
    #[arg(long, default_value_t = 0)]
    max_delay: u32,

    #[command(flatten)]
    generator: GeneratorArgs,

    #[command(flatten)]
    filter: FilterArgs,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let profile = load_profile(&args.profiles, &args.profile)?;
    let method: Method = args.generator.method.into();
    let protocol = Protocol::new(method, args.generator.encounter.into())?;
    let config = args.generator.config(profile.tid, profile.sid);
    let generator = StationaryGenerator::new(config, protocol, args.filter.filter())?;
    let searcher = StationarySearcher::new(profile, args.min_delay, args.max_delay)?;
    let threads = args.threads.unwrap_or_else(num_cpus);

    println!(
        "Searching {} to {} with profile {:?} ({:?}, {} threads)...",
        args.start, args.end, args.profile, protocol, threads
    );

    let start = Instant::now();
    let progress = SearchProgress::new();
    let total = searcher.total_progress(method, args.start, args.end);
    run_with_progress("Search", &progress, total, || {
        searcher.search(&generator, args.start, args.end, threads, &progress)
    })?;

    let mut results = progress.take_results();
    results.sort_by_key(|r| (r.datetime, r.timer0, r.seed, r.outcome.advances));
    for result in &results {
        println!("{}", format_result(result));
    }
    println!(
        "Found {} result(s) in {:.2} seconds",
        results.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
