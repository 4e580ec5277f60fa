//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Each runner builds a
//! [`SearchConfig`] from the global flags, calls into the library and prints
//! results to stdout. Progress goes through `tracing` to stderr.

use anyhow::{Context, Result};
use primekex::{Exchange, PrimeSearch, SearchConfig, Tester};
use rug::Integer;
use tracing::info;

use super::Cli;

/// Map global flags onto the library's search configuration.
fn search_config(cli: &Cli) -> SearchConfig {
    SearchConfig {
        security_level: cli.security_level,
        batch_size: cli.batch_size,
        attempts: cli.attempts,
        strategy: cli.strategy,
        threads: cli.threads,
    }
}

fn find(cli: &Cli, min: &Integer, max: &Integer) -> Result<(PrimeSearch, Integer)> {
    let search = PrimeSearch::new(search_config(cli)).context("invalid search configuration")?;
    let p = search
        .find_prime(min, max)
        .with_context(|| format!("prime search in [{}, {}] failed", min, max))?;
    Ok((search, p))
}

// ── Exchange ────────────────────────────────────────────────────

/// Find `p`, run the exchange and print the transcript.
pub fn run_exchange(cli: &Cli, min: &Integer, max: &Integer, json: bool) -> Result<()> {
    info!("finding a large prime p");
    let (search, p) = find(cli, min, max)?;

    let exchange = Exchange::run(p).context("key exchange failed")?;
    let t = exchange.transcript();

    if json {
        let report = serde_json::json!({
            "config": search.config(),
            "exchange": t,
            "stats": search.stats().snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("[PUBLIC]             p = {}", t.p);
    println!("[PUBLIC]             x = {}", t.x);
    println!("[SECRET A]           a = {}", t.a);
    println!("[SECRET B]           b = {}", t.b);
    println!("[PUBLIC] A -> B:     x^a mod p = {}", t.alpha);
    println!("[PUBLIC] B -> A:     x^b mod p = {}", t.beta);
    println!("[SECRET A,B]         Kab = {}", t.kab);
    println!("[SECRET A,B]         Kba = {}", t.kba);
    println!("[SECRET A,B]         SHA-256(K) = {}", t.key_sha256);
    Ok(())
}

// ── Prime Search ────────────────────────────────────────────────

pub fn run_find_prime(cli: &Cli, min: &Integer, max: &Integer) -> Result<()> {
    let (_, p) = find(cli, min, max)?;
    println!("{}", p);
    Ok(())
}

// ── Primality Test ──────────────────────────────────────────────

pub fn run_is_prime(cli: &Cli, n: &Integer) -> Result<()> {
    let tester = Tester::new(cli.security_level).context("invalid security level")?;
    info!(rounds = tester.rounds_for(n), "testing {}", n);
    let verdict = tester.is_prime(n)?;
    println!("{}", if verdict { "prime" } else { "composite" });
    Ok(())
}
