//! # Entropy — Secure Uniform Sampling of Big Integers
//!
//! All randomness in the crate (Miller-Rabin bases, candidates, Diffie-Hellman
//! generator and private exponents) comes from the operating system CSPRNG via
//! `rand::rngs::OsRng`. Failures to read entropy propagate as
//! [`Error::Entropy`]; nothing falls back to a seeded generator.
//!
//! Sampling uses rejection: draw `bits(bound)` random bits, retry if the value
//! is `≥ bound`. Each draw is accepted with probability above 1/2, so the
//! expected number of draws is below two and the result is exactly uniform.

use rand::rngs::OsRng;
use rand::RngCore;
use rug::integer::Order;
use rug::Integer;

use crate::error::{Error, Result};

/// Uniform integer in `[0, bound)`.
pub fn random_below(bound: &Integer) -> Result<Integer> {
    if *bound <= 0u32 {
        return Err(Error::InvalidParameter(format!(
            "sampling bound must be positive (got {})",
            bound
        )));
    }
    let bits = bound.significant_bits();
    let mut buf = vec![0u8; (bits as usize).div_ceil(8)];
    loop {
        OsRng.try_fill_bytes(&mut buf)?;
        let mut candidate = Integer::from_digits(&buf, Order::Msf);
        candidate.keep_bits_mut(bits);
        if candidate < *bound {
            return Ok(candidate);
        }
    }
}

/// Uniform integer in the inclusive range `[low, high]`.
pub fn random_in_range(low: &Integer, high: &Integer) -> Result<Integer> {
    if low > high {
        return Err(Error::invalid_range(low, high, "lower bound exceeds upper bound"));
    }
    let span = Integer::from(high - low) + 1u32;
    Ok(random_below(&span)? + low)
}

/// One uniformly random bit.
pub fn random_bool() -> Result<bool> {
    let mut byte = [0u8; 1];
    OsRng.try_fill_bytes(&mut byte)?;
    Ok(byte[0] & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_below_stays_under_bound() {
        let bound = Integer::from(1000);
        for _ in 0..500 {
            let x = random_below(&bound).unwrap();
            assert!(x >= 0 && x < bound, "sample {} out of [0, 1000)", x);
        }
    }

    /// A bound of one admits only zero.
    #[test]
    fn random_below_one_is_zero() {
        for _ in 0..20 {
            assert_eq!(random_below(&Integer::from(1)).unwrap(), 0);
        }
    }

    #[test]
    fn random_below_rejects_non_positive_bound() {
        assert!(matches!(
            random_below(&Integer::from(0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(random_below(&Integer::from(-5)).is_err());
    }

    /// Every value of a tiny range is reachable (2^-400 chance of a miss per value).
    #[test]
    fn random_in_range_hits_both_ends() {
        let low = Integer::from(11);
        let high = Integer::from(13);
        let mut seen = [false; 3];
        for _ in 0..400 {
            let x = random_in_range(&low, &high).unwrap();
            let idx = (x - 11u32).to_usize().unwrap();
            seen[idx] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn random_in_range_single_point() {
        let p = Integer::from(7919);
        assert_eq!(random_in_range(&p, &p).unwrap(), p);
    }

    #[test]
    fn random_in_range_rejects_inverted_bounds() {
        let r = random_in_range(&Integer::from(5), &Integer::from(4));
        assert!(matches!(r, Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn random_in_range_large_bounds() {
        let low = Integer::from(1) << 255;
        let high = (Integer::from(1) << 256) - 1u32;
        for _ in 0..50 {
            let x = random_in_range(&low, &high).unwrap();
            assert_eq!(x.significant_bits(), 256);
        }
    }
}
