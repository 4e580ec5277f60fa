//! # Error — Failure Taxonomy for Search and Exchange
//!
//! Every fallible operation in the library returns [`Result`]. The variants map
//! one-to-one onto the ways a prime search or key exchange can stop:
//!
//! - **Caller errors** (`InvalidRange`, `InvalidSecurityLevel`,
//!   `InvalidParameter`) are rejected before any work starts.
//! - **Search exhaustion** (`SearchExhausted`) means every allotted batch came
//!   back composite. The caller decides whether to retry with a wider range or
//!   more attempts; nothing retries internally.
//! - **Fatal conditions** (`Entropy`, `SharedSecretMismatch`) indicate the OS
//!   random source failed or the exchange arithmetic is broken. Neither has a
//!   degraded fallback.
//!
//! Messages never contain private exponents or shared secrets.

use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Every batch was tested without finding a prime.
    #[error("no prime found after {attempts} batches of {batch_size} candidates")]
    SearchExhausted { attempts: u32, batch_size: usize },

    /// The requested range cannot produce a candidate.
    #[error("invalid candidate range [{min}, {max}]: {reason}")]
    InvalidRange {
        min: String,
        max: String,
        reason: &'static str,
    },

    /// Security level below the minimum of one Miller-Rabin round.
    #[error("security level must be at least 1 (got {0})")]
    InvalidSecurityLevel(u32),

    /// A numeric argument outside what the operation accepts.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The two parties derived different shared secrets.
    #[error("shared secrets do not match; exchange arithmetic is inconsistent")]
    SharedSecretMismatch,

    /// The operating system's secure random source failed.
    #[error("secure random source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    /// The worker pool for parallel testing could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn invalid_range(
        min: &rug::Integer,
        max: &rug::Integer,
        reason: &'static str,
    ) -> Self {
        Error::InvalidRange {
            min: min.to_string(),
            max: max.to_string(),
            reason,
        }
    }
}
