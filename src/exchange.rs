//! # Exchange — Finite-Field Diffie-Hellman Over a Searched Prime
//!
//! Two parties agree on a shared secret over the multiplicative group mod `p`:
//!
//! ```text
//!   public:  p (prime), x ∈ [2, p−2]
//!   A:       a ∈ [1, p−3]   α = x^a mod p   ──α──▶
//!   B:       b ∈ [1, p−3]   β = x^b mod p   ◀──β──
//!   A:       Kab = β^a mod p
//!   B:       Kba = α^b mod p          Kab = x^(ab) = Kba
//! ```
//!
//! `Kab == Kba` holds for every valid `(p, x, a, b)` because exponentiation
//! commutes. A mismatch can only come from broken arithmetic or corrupted
//! parameters, so [`Exchange`] reports it as [`Error::SharedSecretMismatch`]
//! and never returns a half-agreed state.
//!
//! The agreed value leaves this module as a [`SharedSecret`]: the canonical
//! big-endian encoding padded to the byte width of `p`, and its SHA-256 digest
//! for a symmetric cipher to use as a 256-bit key. Cipher modes, IVs and padding
//! belong to that cipher.
//!
//! The generator is drawn at random rather than checked for primitivity; the
//! resulting subgroup may be small. This matches a demonstration exchange, not
//! a hardened one.

use rug::integer::Order;
use rug::Integer;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, error};

use crate::entropy;
use crate::error::{Error, Result};
use crate::pow_mod;

/// Public group parameters: prime modulus and generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParams {
    p: Integer,
    x: Integer,
}

impl GroupParams {
    /// Validate `p ≥ 5` and `2 ≤ x ≤ p − 2`.
    pub fn new(p: Integer, x: Integer) -> Result<Self> {
        check_modulus(&p)?;
        let high = Integer::from(&p - 2u32);
        if x < 2u32 || x > high {
            return Err(Error::InvalidParameter(format!(
                "generator must lie in [2, {}] (got {})",
                high, x
            )));
        }
        Ok(GroupParams { p, x })
    }

    /// Draw a uniform generator in `[2, p − 2]`.
    pub fn random(p: Integer) -> Result<Self> {
        check_modulus(&p)?;
        let x = entropy::random_in_range(&Integer::from(2u32), &Integer::from(&p - 2u32))?;
        Ok(GroupParams { p, x })
    }

    pub fn modulus(&self) -> &Integer {
        &self.p
    }

    pub fn generator(&self) -> &Integer {
        &self.x
    }

    /// Byte width of the modulus, the fixed width of every encoded group element.
    pub fn byte_width(&self) -> usize {
        (self.p.significant_bits() as usize).div_ceil(8)
    }

    /// Largest permitted private exponent, `p − 3`.
    fn max_private(&self) -> Integer {
        Integer::from(&self.p - 3u32)
    }
}

fn check_modulus(p: &Integer) -> Result<()> {
    if *p < 5u32 {
        return Err(Error::InvalidParameter(format!(
            "modulus must be at least 5 (got {})",
            p
        )));
    }
    Ok(())
}

/// One side of the exchange: private exponent and derived public value.
#[derive(Clone)]
pub struct Party {
    private: Integer,
    public: Integer,
}

impl Party {
    /// Draw a private exponent uniformly from `[1, p − 3]`.
    pub fn generate(params: &GroupParams) -> Result<Self> {
        let private = entropy::random_in_range(&Integer::from(1u32), &params.max_private())?;
        Party::from_private(params, private)
    }

    pub fn from_private(params: &GroupParams, private: Integer) -> Result<Self> {
        let max = params.max_private();
        if private < 1u32 || private > max {
            return Err(Error::InvalidParameter(format!(
                "private exponent must lie in [1, {}]",
                max
            )));
        }
        let public = pow_mod(&params.x, &private, &params.p)?;
        Ok(Party { private, public })
    }

    /// The value sent to the peer.
    pub fn public(&self) -> &Integer {
        &self.public
    }

    pub fn private(&self) -> &Integer {
        &self.private
    }

    /// Combine the peer's public value with our private exponent.
    pub fn agree(&self, params: &GroupParams, peer_public: &Integer) -> Result<SharedSecret> {
        if *peer_public < 1u32 || *peer_public >= params.p {
            return Err(Error::InvalidParameter(
                "peer public value outside [1, p − 1]".into(),
            ));
        }
        let value = pow_mod(peer_public, &self.private, &params.p)?;
        Ok(SharedSecret {
            value,
            width: params.byte_width(),
        })
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("private", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

/// The agreed group element, handed to a symmetric cipher for key derivation.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret {
    value: Integer,
    width: usize,
}

impl SharedSecret {
    pub fn value(&self) -> &Integer {
        &self.value
    }

    /// Big-endian encoding left-padded to the byte width of `p`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let digits = self.value.to_digits::<u8>(Order::Msf);
        let mut out = vec![0u8; self.width.saturating_sub(digits.len())];
        out.extend_from_slice(&digits);
        out
    }

    /// SHA-256 of [`to_bytes`](Self::to_bytes): a 256-bit symmetric key.
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.to_bytes()).into()
    }

    pub fn hex_digest(&self) -> String {
        hex::encode(self.digest())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("value", &"<redacted>")
            .field("width", &self.width)
            .finish()
    }
}

/// A completed two-party exchange with both sides' views.
#[derive(Debug, Clone)]
pub struct Exchange {
    params: GroupParams,
    alice: Party,
    bob: Party,
    kab: SharedSecret,
    kba: SharedSecret,
}

impl Exchange {
    /// Random generator and private exponents over the prime `p`.
    pub fn run(p: Integer) -> Result<Self> {
        let params = GroupParams::random(p)?;
        let alice = Party::generate(&params)?;
        let bob = Party::generate(&params)?;
        Exchange::complete(params, alice, bob)
    }

    /// Exchange over caller-chosen `(p, x, a, b)`.
    pub fn from_parts(p: Integer, x: Integer, a: Integer, b: Integer) -> Result<Self> {
        let params = GroupParams::new(p, x)?;
        let alice = Party::from_private(&params, a)?;
        let bob = Party::from_private(&params, b)?;
        Exchange::complete(params, alice, bob)
    }

    fn complete(params: GroupParams, alice: Party, bob: Party) -> Result<Self> {
        debug!(
            p = %params.p,
            alpha = %alice.public,
            beta = %bob.public,
            "public values exchanged"
        );
        let kab = alice.agree(&params, bob.public())?;
        let kba = bob.agree(&params, alice.public())?;
        if kab != kba {
            error!(p = %params.p, "shared secrets disagree");
            return Err(Error::SharedSecretMismatch);
        }
        Ok(Exchange {
            params,
            alice,
            bob,
            kab,
            kba,
        })
    }

    pub fn params(&self) -> &GroupParams {
        &self.params
    }

    pub fn p(&self) -> &Integer {
        &self.params.p
    }

    pub fn generator(&self) -> &Integer {
        &self.params.x
    }

    pub fn a(&self) -> &Integer {
        self.alice.private()
    }

    pub fn b(&self) -> &Integer {
        self.bob.private()
    }

    /// `x^a mod p`, sent from A to B.
    pub fn alpha(&self) -> &Integer {
        self.alice.public()
    }

    /// `x^b mod p`, sent from B to A.
    pub fn beta(&self) -> &Integer {
        self.bob.public()
    }

    /// Secret as computed by A.
    pub fn kab(&self) -> &SharedSecret {
        &self.kab
    }

    /// Secret as computed by B.
    pub fn kba(&self) -> &SharedSecret {
        &self.kba
    }

    /// The agreed secret (`kab`, equal to `kba`).
    pub fn shared_secret(&self) -> &SharedSecret {
        &self.kab
    }

    pub fn transcript(&self) -> Transcript {
        Transcript {
            p: self.p().to_string(),
            x: self.generator().to_string(),
            a: self.a().to_string(),
            b: self.b().to_string(),
            alpha: self.alpha().to_string(),
            beta: self.beta().to_string(),
            kab: self.kab.value().to_string(),
            kba: self.kba.value().to_string(),
            key_sha256: self.shared_secret().hex_digest(),
        }
    }
}

/// Every value of an exchange as decimal strings, for display or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub p: String,
    pub x: String,
    pub a: String,
    pub b: String,
    pub alpha: String,
    pub beta: String,
    pub kab: String,
    pub kba: String,
    pub key_sha256: String,
}
