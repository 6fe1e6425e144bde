//! Entralink calibration CLI
//!
//! Usage: gen5seed_calibrate --profiles <file> --profile <name> --reading <hex> --year <year> [options]
//!
//! Example: gen5seed_calibrate --profiles profiles.json --profile white \
//!     --reading 9C0E03A5 --year 2023 --calibration 30 --frame 21

mod common;

use clap::Parser;
use common::{FilterArgs, format_outcome, format_result, parse_hex_u32, run_with_progress};
use gen5seed::infra::profile_io::load_profile;
use gen5seed::{CalibrationSearcher, CalibrationTarget, SearchProgress};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gen5seed_calibrate")]
#[command(about = "Reverse an Entralink C-Gear reading into boot seeds", long_about = None)]
struct Args {
    /// Profile file (JSON array)
    #[arg(long)]
    profiles: PathBuf,

    /// Profile name
    #[arg(long)]
    profile: String,

    /// C-Gear seed shown by the game (hexadecimal)
    #[arg(long, value_parser = parse_hex_u32)]
    reading: u32,

    /// Year the reading was taken in
    #[arg(long)]
    year: i32,

    /// Delay calibration
    #[arg(long, default_value_t = 0)]
    calibration: u32,

    /// Advance of the C-Gear IV frame
    #[arg(long, default_value_t = 0)]
    frame: u32,

    /// First advance of the Entralink projection
    #[arg(long, default_value_t = 0)]
    initial: u32,

    /// Advances after the first
    #[arg(long, default_value_t = 0)]
    max: u32,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    filter: FilterArgs,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let profile = load_profile(&args.profiles, &args.profile)?;
    let searcher = CalibrationSearcher::new(profile)?;
    let target = CalibrationTarget {
        reading: args.reading,
        year: args.year,
        calibration: args.calibration,
        cgear_frame: args.frame,
    };
    let threads = args.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let packed = target.decompose(searcher.profile().mac);
    println!(
        "Reading {:08X}: checksum {}, hour {}, delay {}",
        args.reading, packed.a, packed.b, packed.delay
    );

    let progress = SearchProgress::new();
    let total = searcher.total_progress(&target);

    let report = run_with_progress("Calibration", &progress, total, || {
        searcher.search(&target, args.initial, args.max, args.filter.filter(), threads, &progress)
    })?;

    match &report.iv_frame {
        Some(frame) => println!("C-Gear IV frame: {}", format_outcome(frame)),
        None => println!("C-Gear IV frame: unavailable"),
    }
    println!("{} candidate date-time(s)", report.datetimes.len());

    let mut results = progress.take_results();
    results.sort_by_key(|r| (r.datetime, r.timer0, r.outcome.advances));
    for result in &results {
        println!("{}", format_result(result));
    }
    println!("Found {} result(s)", results.len());
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
