pub mod candidate;
pub mod entropy;
pub mod error;
pub mod exchange;
pub mod primality;
pub mod search;
pub mod sieve;
pub mod stats;

pub use candidate::{CandidateGenerator, CandidateStrategy};
pub use error::{Error, Result};
pub use exchange::{Exchange, GroupParams, Party, SharedSecret};
pub use primality::{is_prime, Tester, Verdict};
pub use search::{find_prime, PrimeSearch, SearchConfig};

use rug::Integer;

/// `base^exp mod modulus` for a non-negative exponent and positive modulus.
pub fn pow_mod(base: &Integer, exp: &Integer, modulus: &Integer) -> Result<Integer> {
    if *exp < 0u32 || *modulus <= 0u32 {
        return Err(Error::InvalidParameter(format!(
            "pow_mod needs exp >= 0 and modulus > 0 (got exp {}, modulus {})",
            exp, modulus
        )));
    }
    base.clone()
        .pow_mod(exp, modulus)
        .map_err(|_| Error::InvalidParameter("modular exponentiation failed".into()))
}

/// Decimal digits of `n`, from its bit length. Exact or one too high.
pub fn estimate_digits(n: &Integer) -> u64 {
    // log10(2) ≈ 30103 / 100000
    u64::from(n.significant_bits()) * 30_103 / 100_000 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rug::ops::Pow;

    #[test]
    fn pow_mod_known_values() {
        let v = |n: u64| Integer::from(n);
        assert_eq!(pow_mod(&v(2), &v(10), &v(1000)).unwrap(), 24);
        assert_eq!(pow_mod(&v(3), &v(4), &v(100)).unwrap(), 81);
        assert_eq!(pow_mod(&v(5), &v(0), &v(7)).unwrap(), 1);
        assert_eq!(pow_mod(&v(5), &v(6), &v(23)).unwrap(), 8);
    }

    #[test]
    fn pow_mod_rejects_bad_arguments() {
        let one = Integer::from(1);
        assert!(pow_mod(&one, &Integer::from(-1), &Integer::from(7)).is_err());
        assert!(pow_mod(&one, &one, &Integer::from(0)).is_err());
    }

    /// Fermat's little theorem on a 127-bit Mersenne prime.
    #[test]
    fn pow_mod_fermat_on_large_prime() {
        let p = Integer::from(2u32).pow(127) - 1u32;
        let e = Integer::from(&p - 1u32);
        assert_eq!(pow_mod(&Integer::from(3), &e, &p).unwrap(), 1);
    }

    #[test]
    fn estimate_digits_within_one_of_exact() {
        let values: Vec<Integer> = vec![
            Integer::from(1u32),
            Integer::from(9u32),
            Integer::from(10u32),
            Integer::from(999u32),
            Integer::from(5_000_000u32),
            Integer::from(10u32).pow(100) - 1u32,
            Integer::from(2u32).pow(2048),
        ];
        for v in &values {
            let est = estimate_digits(v);
            let exact = v.to_string_radix(10).len() as u64;
            assert!(
                (est as i64 - exact as i64).abs() <= 1,
                "estimate_digits({}) = {} but exact = {}",
                v,
                est,
                exact
            );
        }
    }

    #[test]
    fn estimate_digits_zero() {
        assert_eq!(estimate_digits(&Integer::from(0u32)), 1);
    }
}
