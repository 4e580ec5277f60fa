//! # Stats — Atomic Prime Search Counters
//!
//! Lock-free counters shared between the search coordinator and the rayon
//! workers running primality tests. Workers bump them with `Relaxed` atomics;
//! nothing reads them for control flow, only for the summary logged when a
//! search ends and for the CLI's JSON report.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug)]
pub struct SearchStats {
    /// Batches dispatched to the pool.
    pub batches: AtomicU64,
    /// Candidates generated.
    pub candidates: AtomicU64,
    /// Candidates rejected by small-prime trial division.
    pub sieve_rejections: AtomicU64,
    /// Miller-Rabin rounds executed (one modular exponentiation each).
    pub mr_rounds: AtomicU64,
    /// Tests abandoned because another candidate in the batch won.
    pub abandoned: AtomicU64,
    start: Instant,
}

/// Point-in-time copy of [`SearchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub batches: u64,
    pub candidates: u64,
    pub sieve_rejections: u64,
    pub mr_rounds: u64,
    pub abandoned: u64,
    pub elapsed_ms: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        SearchStats {
            batches: AtomicU64::new(0),
            candidates: AtomicU64::new(0),
            sieve_rejections: AtomicU64::new(0),
            mr_rounds: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            sieve_rejections: self.sieve_rejections.load(Ordering::Relaxed),
            mr_rounds: self.mr_rounds.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        let rate = if s.elapsed_ms > 0 {
            s.candidates as f64 * 1000.0 / s.elapsed_ms as f64
        } else {
            0.0
        };
        info!(
            batches = s.batches,
            candidates = s.candidates,
            sieve_rejections = s.sieve_rejections,
            mr_rounds = s.mr_rounds,
            abandoned = s.abandoned,
            rate = format_args!("{:.1}/s", rate),
            elapsed_ms = s.elapsed_ms,
            "prime search summary"
        );
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counters_start_at_zero() {
        let s = SearchStats::new().snapshot();
        assert_eq!(s.batches, 0);
        assert_eq!(s.candidates, 0);
        assert_eq!(s.sieve_rejections, 0);
        assert_eq!(s.mr_rounds, 0);
        assert_eq!(s.abandoned, 0);
    }

    /// 8 threads × 1000 bumps must total exactly 8000.
    #[test]
    fn concurrent_bumps_are_atomic() {
        let stats = Arc::new(SearchStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        SearchStats::bump(&stats.mr_rounds);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot().mr_rounds, 8000);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let stats = SearchStats::new();
        SearchStats::bump(&stats.batches);
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["batches"], 1);
        assert!(json.get("elapsed_ms").is_some());
    }

    #[test]
    fn log_summary_does_not_panic_at_zero_elapsed() {
        SearchStats::new().log_summary();
    }
}
