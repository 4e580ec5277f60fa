//! # Candidate — Random Odd Integers in a Range
//!
//! Produces the integers the search coordinator hands to the primality tester.
//! Two strategies are available:
//!
//! - **`UniformOdd`**: a uniform integer in `[min, max]`, nudged to the adjacent
//!   odd value when even (up by one, or down by one at the upper edge).
//! - **`SixK`** (default): every prime above 3 is `6k ± 1`, so drawing `k` and a
//!   sign skips all multiples of 2 and 3. A third of odd numbers are multiples
//!   of 3, which makes each candidate ~1.5× as likely to be prime as a uniform
//!   odd draw. Draws landing outside `[min, max]` (possible only at the two
//!   edges of the `k` range) are rejected and redrawn.
//!
//! `SixK` can never produce 2 or 3. A range that contains no `6k ± 1` value
//! (`[3, 4]`, `[8, 10]`) is drawn with `UniformOdd` instead, so every range
//! holding an odd integer stays searchable.

use rug::Integer;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::entropy;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateStrategy {
    #[serde(rename = "uniform")]
    UniformOdd,
    #[default]
    SixK,
}

impl fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateStrategy::UniformOdd => write!(f, "uniform"),
            CandidateStrategy::SixK => write!(f, "six-k"),
        }
    }
}

impl FromStr for CandidateStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "uniform" | "uniform-odd" => Ok(CandidateStrategy::UniformOdd),
            "six-k" | "6k" => Ok(CandidateStrategy::SixK),
            other => Err(format!(
                "unknown candidate strategy '{}' (expected 'uniform' or 'six-k')",
                other
            )),
        }
    }
}

/// Validated range plus strategy; draws candidates on demand.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    min: Integer,
    max: Integer,
    strategy: CandidateStrategy,
    /// Inclusive `k` range for `SixK`; unused for `UniformOdd`.
    k_range: (Integer, Integer),
}

impl CandidateGenerator {
    pub fn new(min: Integer, max: Integer, strategy: CandidateStrategy) -> Result<Self> {
        if min < 0u32 {
            return Err(Error::invalid_range(&min, &max, "bounds must be non-negative"));
        }
        if min >= max {
            return Err(Error::invalid_range(&min, &max, "min must be below max"));
        }

        // Smallest k with 6k+1 ≥ min, largest k with 6k−1 ≤ max
        let k_lo = (Integer::from(&min + 4u32) / 6u32).max(Integer::from(1u32));
        let k_hi = Integer::from(&max + 1u32) / 6u32;

        let strategy = if strategy == CandidateStrategy::SixK
            && !has_six_k(&min, &max, &k_lo, &k_hi)
        {
            debug!(%min, %max, "no 6k±1 value in range, drawing uniform odd candidates");
            CandidateStrategy::UniformOdd
        } else {
            strategy
        };

        Ok(CandidateGenerator {
            min,
            max,
            strategy,
            k_range: (k_lo, k_hi),
        })
    }

    pub fn min(&self) -> &Integer {
        &self.min
    }

    pub fn max(&self) -> &Integer {
        &self.max
    }

    pub fn strategy(&self) -> CandidateStrategy {
        self.strategy
    }

    /// One odd candidate in `[min, max]`.
    pub fn generate(&self) -> Result<Integer> {
        match self.strategy {
            CandidateStrategy::UniformOdd => self.uniform_odd(),
            CandidateStrategy::SixK => self.six_k(),
        }
    }

    /// `count` independent candidates.
    pub fn batch(&self, count: usize) -> Result<Vec<Integer>> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn uniform_odd(&self) -> Result<Integer> {
        let mut x = entropy::random_in_range(&self.min, &self.max)?;
        if x.is_even() {
            if x < self.max {
                x += 1u32;
            } else {
                x -= 1u32;
            }
        }
        Ok(x)
    }

    fn six_k(&self) -> Result<Integer> {
        let (k_lo, k_hi) = &self.k_range;
        loop {
            let k = entropy::random_in_range(k_lo, k_hi)?;
            let six_k = k * 6u32;
            let candidate = if entropy::random_bool()? {
                six_k + 1u32
            } else {
                six_k - 1u32
            };
            if candidate >= self.min && candidate <= self.max {
                return Ok(candidate);
            }
        }
    }
}

/// True if some `6k ± 1` with `k` in `[k_lo, k_hi]` lies inside `[min, max]`.
fn has_six_k(min: &Integer, max: &Integer, k_lo: &Integer, k_hi: &Integer) -> bool {
    if k_lo > k_hi {
        return false;
    }
    let six_k = Integer::from(k_lo * 6u32);
    let first = if Integer::from(&six_k - 1u32) >= *min {
        six_k - 1u32
    } else {
        six_k + 1u32
    };
    first <= *max
}

/// One candidate from `[min_val, max_val]` using the default strategy.
pub fn generate(min_val: &Integer, max_val: &Integer) -> Result<Integer> {
    CandidateGenerator::new(min_val.clone(), max_val.clone(), CandidateStrategy::default())?
        .generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(min: u64, max: u64, strategy: CandidateStrategy) -> CandidateGenerator {
        CandidateGenerator::new(Integer::from(min), Integer::from(max), strategy).unwrap()
    }

    #[test]
    fn strategy_parses_and_displays() {
        assert_eq!("uniform".parse(), Ok(CandidateStrategy::UniformOdd));
        assert_eq!("six-k".parse(), Ok(CandidateStrategy::SixK));
        assert_eq!("6k".parse(), Ok(CandidateStrategy::SixK));
        assert!("gaussian".parse::<CandidateStrategy>().is_err());
        assert_eq!(CandidateStrategy::SixK.to_string(), "six-k");
        assert_eq!(CandidateStrategy::UniformOdd.to_string(), "uniform");
        assert_eq!(CandidateStrategy::default(), CandidateStrategy::SixK);
    }

    #[test]
    fn inverted_or_empty_range_rejected() {
        for strategy in [CandidateStrategy::UniformOdd, CandidateStrategy::SixK] {
            let r = CandidateGenerator::new(Integer::from(13), Integer::from(11), strategy);
            assert!(matches!(r, Err(Error::InvalidRange { .. })));
            let r = CandidateGenerator::new(Integer::from(13), Integer::from(13), strategy);
            assert!(matches!(r, Err(Error::InvalidRange { .. })));
        }
    }

    #[test]
    fn negative_bounds_rejected() {
        let r = CandidateGenerator::new(
            Integer::from(-10),
            Integer::from(10),
            CandidateStrategy::UniformOdd,
        );
        assert!(matches!(r, Err(Error::InvalidRange { .. })));
    }

    /// [2, 4], [3, 4] and [8, 10] hold odd integers but no 6k±1 value.
    #[test]
    fn six_k_without_member_draws_uniform_odd() {
        for (min, max, only) in [(2, 4, 3), (3, 4, 3), (8, 10, 9)] {
            let g = gen(min, max, CandidateStrategy::SixK);
            assert_eq!(g.strategy(), CandidateStrategy::UniformOdd);
            for _ in 0..50 {
                assert_eq!(g.generate().unwrap(), only, "[{}, {}]", min, max);
            }
        }
    }

    #[test]
    fn six_k_kept_when_range_has_member() {
        assert_eq!(gen(5, 6, CandidateStrategy::SixK).strategy(), CandidateStrategy::SixK);
        assert_eq!(gen(11, 13, CandidateStrategy::SixK).strategy(), CandidateStrategy::SixK);
        assert_eq!(gen(2, 5, CandidateStrategy::SixK).strategy(), CandidateStrategy::SixK);
    }

    #[test]
    fn uniform_candidates_are_odd_and_in_range() {
        let g = gen(100_000, 5_000_000, CandidateStrategy::UniformOdd);
        for _ in 0..1000 {
            let c = g.generate().unwrap();
            assert!(c.is_odd());
            assert!(c >= 100_000 && c <= 5_000_000, "{}", c);
        }
    }

    #[test]
    fn six_k_candidates_avoid_two_and_three() {
        let g = gen(100_000, 5_000_000, CandidateStrategy::SixK);
        for _ in 0..1000 {
            let c = g.generate().unwrap();
            assert!(c >= 100_000 && c <= 5_000_000, "{}", c);
            let r = c.mod_u(6);
            assert!(r == 1 || r == 5, "{} ≡ {} (mod 6)", c, r);
        }
    }

    /// Upper edge: an even draw equal to max must step down, not out of range.
    #[test]
    fn uniform_even_max_stays_in_range() {
        let g = gen(9, 10, CandidateStrategy::UniformOdd);
        for _ in 0..100 {
            assert_eq!(g.generate().unwrap(), 9);
        }
    }

    /// 11 = 6·2−1 and 13 = 6·2+1: both must be reachable by either strategy.
    #[test]
    fn twin_prime_boundary_reaches_both_ends() {
        for strategy in [CandidateStrategy::UniformOdd, CandidateStrategy::SixK] {
            let g = gen(11, 13, strategy);
            let (mut saw_11, mut saw_13) = (false, false);
            for _ in 0..400 {
                let c = g.generate().unwrap();
                assert!(c == 11 || c == 13, "{:?} produced {}", strategy, c);
                saw_11 |= c == 11;
                saw_13 |= c == 13;
            }
            assert!(saw_11 && saw_13, "{:?} missed an endpoint", strategy);
        }
    }

    #[test]
    fn batch_has_requested_size() {
        let g = gen(1_000, 2_000, CandidateStrategy::SixK);
        let batch = g.batch(8).unwrap();
        assert_eq!(batch.len(), 8);
        assert!(batch.iter().all(|c| c.is_odd()));
    }

    #[test]
    fn free_generate_uses_default_strategy() {
        let c = generate(&Integer::from(1_000), &Integer::from(1_100)).unwrap();
        assert!(c.is_odd());
        assert!(c >= 1_000 && c <= 1_100);
    }
}
