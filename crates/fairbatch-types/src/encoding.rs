//! Hex encoding and parsing for addresses and commitment digests.
//!
//! Wire format follows EVM conventions: lowercase hex with a `0x` prefix,
//! 42 characters for an address and 66 for a 32-byte digest.

use crate::errors::ValidationError;
use crate::{Address, CommitmentDigest};

/// Parse a `0x`-prefixed 40-hex-char account address.
pub fn parse_address(value: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress {
        value: value.to_string(),
    };

    let hex_part = value.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 40 {
        return Err(invalid());
    }

    let bytes = hex::decode(hex_part).map_err(|_| invalid())?;
    Ok(Address::from_slice(&bytes))
}

/// Render an address as `0x` + 40 lowercase hex chars.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Parse a `0x`-prefixed 64-hex-char commitment digest (66 chars total).
pub fn parse_digest(value: &str) -> Result<CommitmentDigest, ValidationError> {
    let invalid = || ValidationError::InvalidDigest {
        value: value.to_string(),
    };

    let hex_part = value.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 64 {
        return Err(invalid());
    }

    let bytes = hex::decode(hex_part).map_err(|_| invalid())?;
    Ok(CommitmentDigest::from_slice(&bytes))
}

/// Render a digest as `0x` + 64 lowercase hex chars.
pub fn format_digest(digest: &CommitmentDigest) -> String {
    format!("0x{}", hex::encode(digest.as_bytes()))
}
