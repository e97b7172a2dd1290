//! MEV accounting attached to a finalized batch.

use crate::errors::ValidationError;
use crate::U256;
use serde::{Deserialize, Serialize};

/// MEV accounting for one finalized batch.
///
/// Wei-denominated fields use 256-bit integers; counters are plain u64.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MevMetrics {
    /// Value an adversary could still extract from the final ordering, in wei.
    pub extracted_value: U256,
    /// Estimated user savings versus naive ordering, in wei.
    pub savings_generated: U256,
    /// Transactions included in the batch.
    pub total_transactions: u64,
    /// Transactions that executed successfully.
    pub successful_transactions: u64,
    /// Mean gas price across the batch, in wei.
    pub average_gas_price: U256,
    /// Total gas consumed by the batch.
    pub total_gas_used: U256,
}

impl MevMetrics {
    /// Build validated metrics.
    ///
    /// # Errors
    /// `MetricsOutOfRange` when `successful_transactions > total_transactions`.
    pub fn new(
        extracted_value: U256,
        savings_generated: U256,
        total_transactions: u64,
        successful_transactions: u64,
        average_gas_price: U256,
        total_gas_used: U256,
    ) -> Result<Self, ValidationError> {
        if successful_transactions > total_transactions {
            return Err(ValidationError::MetricsOutOfRange {
                successful: successful_transactions,
                total: total_transactions,
            });
        }

        Ok(Self {
            extracted_value,
            savings_generated,
            total_transactions,
            successful_transactions,
            average_gas_price,
            total_gas_used,
        })
    }

    /// Fraction of included transactions that succeeded, in [0, 1].
    pub fn success_rate(&self) -> f64 {
        if self.total_transactions == 0 {
            return 0.0;
        }
        self.successful_transactions as f64 / self.total_transactions as f64
    }
}
