//! Transaction payloads and their canonical byte encoding.

use crate::errors::ValidationError;
use crate::{Address, U256};
use serde::{Deserialize, Serialize};

/// The payload a user hides behind a commitment.
///
/// The canonical encoding produced by [`TransactionData::canonical_bytes`]
/// is the byte string fed to the commitment hasher. Coordinator and clients
/// must agree on it exactly; any drift breaks the binding guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    /// Recipient address.
    pub to: Address,
    /// Transfer amount in wei.
    pub value: U256,
    /// Call data (may be empty).
    pub data: Vec<u8>,
    /// Gas limit, strictly positive.
    pub gas_limit: u64,
    /// Gas price in wei, strictly positive.
    pub gas_price: U256,
    /// Sender account nonce.
    pub nonce: u64,
}

impl TransactionData {
    /// Build a validated payload.
    ///
    /// # Errors
    /// - `ZeroGasLimit` when `gas_limit == 0`
    /// - `ZeroGasPrice` when `gas_price == 0`
    pub fn new(
        to: Address,
        value: U256,
        data: Vec<u8>,
        gas_limit: u64,
        gas_price: U256,
        nonce: u64,
    ) -> Result<Self, ValidationError> {
        if gas_limit == 0 {
            return Err(ValidationError::ZeroGasLimit);
        }
        if gas_price.is_zero() {
            return Err(ValidationError::ZeroGasPrice);
        }

        Ok(Self {
            to,
            value,
            data,
            gas_limit,
            gas_price,
            nonce,
        })
    }

    /// Canonical byte encoding, in field order
    /// `to, value, data, gas_limit, gas_price, nonce`.
    ///
    /// Layout: 20-byte address, 32-byte big-endian value, u32 big-endian
    /// data length followed by the data, u64 big-endian gas limit,
    /// 32-byte big-endian gas price, u64 big-endian nonce. The length
    /// prefix keeps the encoding injective for arbitrary call data.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + 32 + 4 + self.data.len() + 8 + 32 + 8);

        out.extend_from_slice(self.to.as_bytes());

        let mut value_be = [0u8; 32];
        self.value.to_big_endian(&mut value_be);
        out.extend_from_slice(&value_be);

        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);

        out.extend_from_slice(&self.gas_limit.to_be_bytes());

        let mut price_be = [0u8; 32];
        self.gas_price.to_big_endian(&mut price_be);
        out.extend_from_slice(&price_be);

        out.extend_from_slice(&self.nonce.to_be_bytes());
        out
    }

    /// Parse a decimal wei amount into a `U256`.
    ///
    /// Used by the request validators; rejects signs, whitespace and
    /// anything that does not fit in 256 bits.
    pub fn parse_amount(value: &str) -> Result<U256, ValidationError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAmount {
                value: value.to_string(),
            });
        }

        U256::from_dec_str(value).map_err(|_| ValidationError::InvalidAmount {
            value: value.to_string(),
        })
    }
}
