//! # Search — Parallel First-Prime-Wins Coordinator
//!
//! Finds a random prime in `[min, max]` by racing batches of candidates on a
//! dedicated rayon pool.
//!
//! ## Algorithm
//!
//! For each of up to `attempts` batches:
//!
//! 1. Draw `batch_size` (default 8) independent candidates.
//! 2. Test them concurrently with `find_map_any`, which yields results in
//!    completion order and stops scheduling new items once one matches.
//! 3. The first candidate to test prime raises the batch's stop flag. Tests
//!    still running notice the flag before their next Miller-Rabin round and
//!    return `Abandoned`, so the batch finishes within one exponentiation of
//!    the winner instead of waiting for the slowest candidate.
//! 4. A batch with no prime moves on to the next; running out of batches is
//!    [`Error::SearchExhausted`].
//!
//! ## Expected Cost
//!
//! Near `N`, roughly one integer in `ln N` is prime. After removing multiples
//! of 2 and 3 (`SixK`) that becomes one in `ln N / 3`: about 5 candidates per
//! prime near 5·10^6, about 60 near 2^256. A batch of 8 therefore usually hits
//! on the first or second try at DH-demo sizes.
//!
//! ## Thread Model
//!
//! The coordinator thread is the only submitter and the only consumer of a
//! batch's results. Workers share the sieve table (immutable), the stop flag
//! and the stats counters (atomics). When `install` returns, no worker holds
//! any reference into the batch.

use rayon::prelude::*;
use rayon::ThreadPool;
use rug::Integer;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::candidate::{CandidateGenerator, CandidateStrategy};
use crate::error::{Error, Result};
use crate::estimate_digits;
use crate::primality::{Tester, Verdict, DEFAULT_SECURITY_LEVEL};
use crate::stats::SearchStats;

/// Candidates tested concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Batches before giving up: 10,000 candidates at the default batch size.
pub const DEFAULT_ATTEMPTS: u32 = 1_250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Minimum Miller-Rabin rounds per candidate.
    pub security_level: u32,
    /// Candidates raced per batch.
    pub batch_size: usize,
    /// Maximum number of batches.
    pub attempts: u32,
    pub strategy: CandidateStrategy,
    /// Worker threads; 0 sizes the pool to `min(batch_size, cores)`.
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            security_level: DEFAULT_SECURITY_LEVEL,
            batch_size: DEFAULT_BATCH_SIZE,
            attempts: DEFAULT_ATTEMPTS,
            strategy: CandidateStrategy::default(),
            threads: 0,
        }
    }
}

impl SearchConfig {
    /// Worker count after resolving `threads = 0`.
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.batch_size.min(cores).max(1)
    }
}

/// Result of racing one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Found(Integer),
    Exhausted,
}

/// Prime search coordinator owning its worker pool and counters.
pub struct PrimeSearch {
    config: SearchConfig,
    pool: ThreadPool,
    stats: SearchStats,
}

impl PrimeSearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        if config.security_level == 0 {
            return Err(Error::InvalidSecurityLevel(config.security_level));
        }
        if config.batch_size == 0 {
            return Err(Error::InvalidParameter("batch size must be at least 1".into()));
        }
        let threads = config.resolved_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("primekex-worker-{}", i))
            .build()?;
        debug!(threads, batch_size = config.batch_size, "search pool started");
        Ok(PrimeSearch {
            config,
            pool,
            stats: SearchStats::new(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Counters accumulated over every search run by this coordinator.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// A verified (probable) prime in `[min_val, max_val]`.
    pub fn find_prime(&self, min_val: &Integer, max_val: &Integer) -> Result<Integer> {
        let generator =
            CandidateGenerator::new(min_val.clone(), max_val.clone(), self.config.strategy)?;
        let tester = Tester::new(self.config.security_level)?.with_stats(&self.stats);

        info!(
            min = %min_val,
            max = %max_val,
            strategy = %self.config.strategy,
            attempts = self.config.attempts,
            threads = self.threads(),
            "searching for prime"
        );

        for attempt in 1..=self.config.attempts {
            let batch = generator.batch(self.config.batch_size)?;
            SearchStats::bump(&self.stats.batches);
            self.stats
                .candidates
                .fetch_add(batch.len() as u64, Ordering::Relaxed);

            match self.race_batch(tester, batch)? {
                BatchOutcome::Found(prime) => {
                    info!(
                        prime = %prime,
                        digits = estimate_digits(&prime),
                        attempt,
                        "prime found"
                    );
                    self.stats.log_summary();
                    return Ok(prime);
                }
                BatchOutcome::Exhausted => {
                    debug!(attempt, "batch exhausted without a prime");
                }
            }
        }

        warn!(attempts = self.config.attempts, "prime search exhausted");
        self.stats.log_summary();
        Err(Error::SearchExhausted {
            attempts: self.config.attempts,
            batch_size: self.config.batch_size,
        })
    }

    /// Test every candidate of `batch` concurrently; first prime observed wins.
    pub fn race_batch(&self, tester: Tester<'_>, batch: Vec<Integer>) -> Result<BatchOutcome> {
        let stop = AtomicBool::new(false);
        let stats = &self.stats;

        let first = self.pool.install(|| {
            batch.into_par_iter().find_map_any(|candidate| {
                match tester.test_until(&candidate, &stop) {
                    Ok(Verdict::Prime) => {
                        stop.store(true, Ordering::Relaxed);
                        Some(Ok(candidate))
                    }
                    Ok(Verdict::Composite) => None,
                    Ok(Verdict::Abandoned) => {
                        SearchStats::bump(&stats.abandoned);
                        None
                    }
                    Err(e) => {
                        stop.store(true, Ordering::Relaxed);
                        Some(Err(e))
                    }
                }
            })
        });

        match first {
            Some(Ok(prime)) => Ok(BatchOutcome::Found(prime)),
            Some(Err(e)) => Err(e),
            None => Ok(BatchOutcome::Exhausted),
        }
    }
}

/// Find a prime in `[min_val, max_val]` with default settings and `attempts` batches.
pub fn find_prime(min_val: &Integer, max_val: &Integer, attempts: u32) -> Result<Integer> {
    PrimeSearch::new(SearchConfig {
        attempts,
        ..SearchConfig::default()
    })?
    .find_prime(min_val, max_val)
}
