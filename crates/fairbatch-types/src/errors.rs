//! Validation errors for value-object constructors.

use thiserror::Error;

/// Rejections raised while constructing a value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Address is not `0x` + 40 hex characters.
    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    /// Digest is not `0x` + 64 hex characters.
    #[error("Invalid commitment digest: {value}")]
    InvalidDigest { value: String },

    /// Amount string is not a non-negative 256-bit decimal integer.
    #[error("Invalid amount: {value}")]
    InvalidAmount { value: String },

    /// Amount arithmetic overflowed 256 bits.
    #[error("Amount overflows 256 bits")]
    AmountOverflow,

    /// Reveal nonce shorter than the required minimum.
    #[error("Nonce too short: {len} chars, need at least {min}")]
    NonceTooShort { len: usize, min: usize },

    /// Commitment timestamp lies in the future.
    #[error("Timestamp {timestamp} is in the future (now {now})")]
    TimestampInFuture { timestamp: u64, now: u64 },

    /// Gas limit must be positive.
    #[error("Gas limit must be positive")]
    ZeroGasLimit,

    /// Gas price must be positive.
    #[error("Gas price must be positive")]
    ZeroGasPrice,

    /// Metrics counters are inconsistent.
    #[error("Successful transactions {successful} exceed total {total}")]
    MetricsOutOfRange { successful: u64, total: u64 },
}
