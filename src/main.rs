//! # Main — CLI Entry Point
//!
//! Parses flags, installs the tracing subscriber, builds the shared small-prime
//! table and dispatches to the subcommand runners in `cli.rs`.
//!
//! ## Subcommands
//!
//! - `exchange`: search a prime in `[--min, --max]` and run a Diffie-Hellman
//!   exchange over it, printing the full transcript.
//! - `find-prime`: print one prime from the range.
//! - `is-prime`: test a single integer.
//!
//! ## Global Options
//!
//! - `-v` / `-vv`: log search progress at info / debug level (stderr).
//! - `--security-level`: minimum Miller-Rabin rounds (default 5).
//! - `--attempts`, `--batch-size`: search budget (default 1250 × 8).
//! - `--strategy`: `six-k` (default) or `uniform` candidate generation.
//! - `--threads`: worker pool size (0 = min(batch size, cores)).
//!
//! Every option also reads a `PRIMEKEX_*` environment variable; `.env` files
//! are loaded first. `LOG_FORMAT=json` switches logs to JSON lines and
//! `RUST_LOG` overrides the level chosen by `-v`.

mod cli;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use primekex::search::{DEFAULT_ATTEMPTS, DEFAULT_BATCH_SIZE};
use primekex::{sieve, CandidateStrategy};
use rug::Integer;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primekex",
    version,
    about = "Find large random primes and run a Diffie-Hellman exchange over them"
)]
struct Cli {
    /// Print intermediate progress (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Minimum Miller-Rabin rounds; operands gain one extra round per 512 bits
    #[arg(long, env = "PRIMEKEX_SECURITY_LEVEL", default_value_t = primekex::primality::DEFAULT_SECURITY_LEVEL)]
    security_level: u32,

    /// Maximum number of candidate batches before the search gives up
    #[arg(long, env = "PRIMEKEX_ATTEMPTS", default_value_t = DEFAULT_ATTEMPTS)]
    attempts: u32,

    /// Candidates tested concurrently per batch
    #[arg(long, env = "PRIMEKEX_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Candidate generation: "six-k" (numbers of the form 6k±1) or "uniform" (any odd)
    #[arg(long, env = "PRIMEKEX_STRATEGY", default_value = "six-k")]
    strategy: CandidateStrategy,

    /// Worker threads for parallel testing (0 = min(batch size, logical cores))
    #[arg(long, env = "PRIMEKEX_THREADS", default_value_t = 0)]
    threads: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a prime p and run a Diffie-Hellman exchange over it
    Exchange {
        /// Lower bound of the prime search range
        #[arg(long, default_value = "100000", value_parser = parse_integer)]
        min: Integer,
        /// Upper bound of the prime search range
        #[arg(long, default_value = "5000000", value_parser = parse_integer)]
        max: Integer,
        /// Emit the transcript as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print one random prime from a range
    FindPrime {
        /// Lower bound of the search range
        #[arg(long, default_value = "100000", value_parser = parse_integer)]
        min: Integer,
        /// Upper bound of the search range
        #[arg(long, default_value = "5000000", value_parser = parse_integer)]
        max: Integer,
    },
    /// Test whether an integer is (probably) prime
    IsPrime {
        /// Decimal integer to test
        #[arg(value_parser = parse_integer)]
        n: Integer,
    },
}

fn parse_integer(s: &str) -> std::result::Result<Integer, String> {
    s.trim()
        .replace('_', "")
        .parse::<Integer>()
        .map_err(|e| format!("'{}' is not an integer: {}", s, e))
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // LOG_FORMAT=json for log shippers, human-readable otherwise
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    sieve::init();

    match &cli.command {
        Commands::Exchange { min, max, json } => cli::run_exchange(&cli, min, max, *json),
        Commands::FindPrime { min, max } => cli::run_find_prime(&cli, min, max),
        Commands::IsPrime { n } => cli::run_is_prime(&cli, n),
    }
}
