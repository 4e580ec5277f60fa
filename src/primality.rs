//! # Primality — Adaptive-Round Miller-Rabin
//!
//! Decides whether a candidate is (probably) prime in two stages:
//!
//! 1. **Small-prime filter.** Candidates within the table bound are answered by
//!    table lookup. Larger candidates divisible by any table prime are
//!    composite. This stage never changes the verdict Miller-Rabin would give;
//!    it only avoids modular exponentiation for most composites.
//! 2. **Miller-Rabin.** Write `n − 1 = 2^s · d` with `d` odd. Each round draws
//!    a base `a ∈ [2, n−2]` from the OS CSPRNG and checks whether `a^d ≡ ±1`
//!    or `a^(2^r·d) ≡ −1 (mod n)` for some `r < s`. A failing round proves `n`
//!    composite and ends the test immediately.
//!
//! ## Round Count
//!
//! `rounds = security_level + bits(n) / 512`. One round mis-classifies a
//! composite with probability at most 1/4, so `rounds` rounds bound the error
//! by `4^−rounds`. The size term only ever adds rounds: a 2048-bit operand gets
//! four more than a 256-bit one at the same security level.
//!
//! ## Cancellation
//!
//! [`Tester::test_until`] checks a stop flag before every round. The search
//! coordinator raises the flag once a batch has a winner, so straggling tests
//! return [`Verdict::Abandoned`] after at most one more exponentiation.

use rug::Integer;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::entropy;
use crate::error::{Error, Result};
use crate::pow_mod;
use crate::sieve::{self, SmallPrimeTable};
use crate::stats::SearchStats;

/// Default minimum number of Miller-Rabin rounds.
pub const DEFAULT_SECURITY_LEVEL: u32 = 5;

/// Operand bits per extra Miller-Rabin round.
pub const BITS_PER_EXTRA_ROUND: u32 = 512;

/// Outcome of a single cancellable primality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Prime,
    Composite,
    /// The stop flag was raised before the test finished.
    Abandoned,
}

/// Miller-Rabin rounds for an operand of `bits` significant bits.
#[inline]
pub fn mr_rounds(bits: u32, security_level: u32) -> u32 {
    security_level + bits / BITS_PER_EXTRA_ROUND
}

/// Probabilistic primality test with the shared small-prime table.
pub fn is_prime(n: &Integer, security_level: u32) -> Result<bool> {
    Tester::new(security_level)?.is_prime(n)
}

/// Primality tester bound to a security level and the shared sieve table.
#[derive(Clone, Copy)]
pub struct Tester<'a> {
    security_level: u32,
    table: &'static SmallPrimeTable,
    stats: Option<&'a SearchStats>,
}

impl<'a> Tester<'a> {
    pub fn new(security_level: u32) -> Result<Self> {
        if security_level == 0 {
            return Err(Error::InvalidSecurityLevel(security_level));
        }
        Ok(Tester {
            security_level,
            table: sieve::small_primes(),
            stats: None,
        })
    }

    /// Record sieve rejections and rounds into `stats`.
    pub fn with_stats(self, stats: &'a SearchStats) -> Self {
        Tester {
            stats: Some(stats),
            ..self
        }
    }

    pub fn security_level(&self) -> u32 {
        self.security_level
    }

    /// Rounds this tester would run on `n`.
    pub fn rounds_for(&self, n: &Integer) -> u32 {
        mr_rounds(n.significant_bits(), self.security_level)
    }

    pub fn is_prime(&self, n: &Integer) -> Result<bool> {
        let never = AtomicBool::new(false);
        Ok(self.test_until(n, &never)? == Verdict::Prime)
    }

    /// Run the full test, giving up with [`Verdict::Abandoned`] once `stop` is set.
    pub fn test_until(&self, n: &Integer, stop: &AtomicBool) -> Result<Verdict> {
        if *n < 2u32 {
            return Ok(Verdict::Composite);
        }
        if let Some(small) = n.to_u64().filter(|&v| v <= self.table.bound()) {
            return Ok(if self.table.contains(small) {
                Verdict::Prime
            } else {
                Verdict::Composite
            });
        }
        // n exceeds the table bound, so every table prime is a proper divisor candidate
        if self.table.smallest_factor(n).is_some() {
            if let Some(stats) = self.stats {
                SearchStats::bump(&stats.sieve_rejections);
            }
            return Ok(Verdict::Composite);
        }
        self.miller_rabin(n, self.rounds_for(n), stop)
    }

    /// Miller-Rabin with `rounds` random bases, no trial division.
    pub fn miller_rabin(&self, n: &Integer, rounds: u32, stop: &AtomicBool) -> Result<Verdict> {
        if *n < 4u32 {
            return Ok(if *n >= 2u32 {
                Verdict::Prime
            } else {
                Verdict::Composite
            });
        }
        if n.is_even() {
            return Ok(Verdict::Composite);
        }

        let n_minus_1 = Integer::from(n - 1u32);
        let s = n_minus_1.find_one(0).unwrap_or(0);
        let d = Integer::from(&n_minus_1 >> s);
        let low = Integer::from(2u32);
        let high = Integer::from(n - 2u32);

        for _ in 0..rounds {
            if stop.load(Ordering::Relaxed) {
                return Ok(Verdict::Abandoned);
            }
            let a = entropy::random_in_range(&low, &high)?;
            if let Some(stats) = self.stats {
                SearchStats::bump(&stats.mr_rounds);
            }

            let mut x = pow_mod(&a, &d, n)?;
            if x == 1u32 || x == n_minus_1 {
                continue;
            }
            let mut witness = true;
            for _ in 1..s {
                x.square_mut();
                x %= n;
                if x == n_minus_1 {
                    witness = false;
                    break;
                }
            }
            if witness {
                return Ok(Verdict::Composite);
            }
        }
        Ok(Verdict::Prime)
    }
}
