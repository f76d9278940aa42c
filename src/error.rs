//! Error types for protocodec-rs.
//!
//! Bit-level transform problems are never raised: they are counted and handed
//! back with the output. The types here cover what can fail before a chain
//! runs (configuration text, CRC setup) and around it (profile files).

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Chain configuration text could not be turned into stages
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    /// CRC engine could not be configured
    #[error("crc error: {0}")]
    Crc(#[from] CrcError),

    /// A bit string contained something other than '0' and '1'
    #[error("invalid bit string {0:?}")]
    InvalidBits(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems found while building a chain from tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// No tokens at all, not even the display name
    #[error("chain configuration is empty")]
    Empty,

    #[error("redundancy multiplier {0:?} is not a non-negative integer")]
    InvalidMultiplier(String),

    #[error("carrier pattern {0:?} must only contain '0' and '1'")]
    InvalidCarrier(String),

    /// One `src:dst` entry of a substitution table is malformed
    #[error("substitution entry {0:?} must look like src:dst with bit strings")]
    InvalidSubstitution(String),

    #[error("external program parameter {0:?} must look like decoder;encoder")]
    InvalidExternal(String),
}

/// CRC engine setup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrcError {
    #[error("unknown CRC polynomial name {0:?}")]
    UnknownPolynomial(String),

    /// Polynomial must at least hold the leading term and one register bit
    #[error("CRC polynomial needs at least 2 bits, got {0}")]
    PolynomialTooShort(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
