//! Seed projection CLI
//!
//! Usage: gen5seed_generate <seed> [options]
//!
//! Example: gen5seed_generate 0123456789ABCDEF --method pid --encounter gift --max 20

mod common;

use clap::Parser;
use common::{FilterArgs, GeneratorArgs, format_outcome, parse_hex_u64};
use gen5seed::{Protocol, StationaryGenerator};

#[derive(Parser)]
#[command(name = "gen5seed_generate")]
#[command(about = "Project one Gen 5 seed into encounter outcomes", long_about = None)]
struct Args {
    /// Seed in hexadecimal (64-bit boot seed or 32-bit C-Gear seed)
    #[arg(value_parser = parse_hex_u64)]
    seed: u64,

    #[command(flatten)]
    generator: GeneratorArgs,

    #[command(flatten)]
    filter: FilterArgs,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let protocol = match Protocol::new(args.generator.method.into(), args.generator.encounter.into()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = args.generator.config(0, 0);
    let generator = match StationaryGenerator::new(config, protocol, args.filter.filter()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Seed {:016X}, {:?}", args.seed, protocol);
    let states = generator.generate(args.seed);
    for state in &states {
        println!("{}", format_outcome(state));
    }
    println!("{} outcome(s)", states.len());
}
