//! Wei/eth unit conversions.

use crate::errors::ValidationError;
use crate::U256;

/// Wei per ether: 10^18.
pub fn wei_per_eth() -> U256 {
    U256::exp10(18)
}

/// Convert whole ether to wei.
///
/// # Errors
/// `AmountOverflow` when the product exceeds 256 bits.
pub fn eth_to_wei(eth: U256) -> Result<U256, ValidationError> {
    eth.checked_mul(wei_per_eth())
        .ok_or(ValidationError::AmountOverflow)
}

/// Convert wei to whole ether, truncating any sub-ether remainder.
pub fn wei_to_eth(wei: U256) -> U256 {
    wei / wei_per_eth()
}

/// The sub-ether remainder of a wei amount.
pub fn wei_remainder(wei: U256) -> U256 {
    wei % wei_per_eth()
}
