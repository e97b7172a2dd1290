//! # Core Value Objects
//!
//! Shared value types for the fairbatch batch-auction coordinator.
//!
//! ## Clusters
//!
//! - **Identity**: [`BatchId`], [`Address`], [`CommitmentDigest`]
//! - **Protocol**: [`Commitment`], [`TransactionData`], [`RevealedTransaction`]
//! - **Accounting**: [`MevMetrics`], wei/eth conversions in [`units`]
//!
//! All constructors validate their inputs and return [`ValidationError`]
//! values; once built, a value object never changes.

use serde::{Deserialize, Serialize};

pub mod commitment;
pub mod encoding;
pub mod errors;
pub mod ids;
pub mod metrics;
pub mod transaction;
pub mod units;

pub use commitment::{Commitment, RevealedTransaction, MIN_NONCE_LEN};
pub use encoding::{format_address, format_digest, parse_address, parse_digest};
pub use errors::ValidationError;
pub use ids::BatchId;
pub use metrics::MevMetrics;
pub use transaction::TransactionData;

// Re-export the 256-bit integer used for all wei amounts.
pub use primitive_types::U256;

/// A 20-byte EVM-style account address.
pub type Address = primitive_types::H160;

/// A 32-byte commitment digest (rendered as `0x` + 64 hex chars).
pub type CommitmentDigest = primitive_types::H256;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// The rule used to derive an order over revealed transactions.
///
/// The coordinator itself only sequences the commit-reveal protocol; the
/// ordering method is recorded on the batch so downstream consumers know
/// which strategy produced the final ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMethod {
    /// Two-phase commit–reveal batch auction.
    CommitReveal,
    /// Threshold-decryption of an encrypted mempool.
    ThresholdDecryption,
    /// Plain arrival-timestamp ordering.
    TimeBased,
}

impl OrderingMethod {
    /// Stable wire name for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommitReveal => "commit-reveal",
            Self::ThresholdDecryption => "threshold-decryption",
            Self::TimeBased => "time-based",
        }
    }
}

impl std::fmt::Display for OrderingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
