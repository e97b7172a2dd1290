//! Commitment and reveal records.

use crate::errors::ValidationError;
use crate::transaction::TransactionData;
use crate::{Address, CommitmentDigest, Timestamp};
use serde::{Deserialize, Serialize};

/// Minimum length of the reveal nonce, in characters.
pub const MIN_NONCE_LEN: usize = 10;

/// A binding but opaque claim on a future reveal.
///
/// Recorded per user during the commitment phase. The digest is all the
/// coordinator learns about the transaction until the reveal arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// 32-byte commitment digest.
    pub digest: CommitmentDigest,
    /// The committing user's address.
    pub user_address: Address,
    /// When the user produced the commitment.
    pub timestamp: Timestamp,
    /// The reveal nonce, if the client chose to disclose it up front.
    pub nonce: Option<String>,
}

impl Commitment {
    /// Build a validated commitment.
    ///
    /// # Errors
    /// - `TimestampInFuture` when `timestamp > now`
    /// - `NonceTooShort` when a nonce is present but under [`MIN_NONCE_LEN`] chars
    pub fn new(
        digest: CommitmentDigest,
        user_address: Address,
        timestamp: Timestamp,
        nonce: Option<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        if timestamp > now {
            return Err(ValidationError::TimestampInFuture { timestamp, now });
        }

        if let Some(ref nonce) = nonce {
            if nonce.len() < MIN_NONCE_LEN {
                return Err(ValidationError::NonceTooShort {
                    len: nonce.len(),
                    min: MIN_NONCE_LEN,
                });
            }
        }

        Ok(Self {
            digest,
            user_address,
            timestamp,
            nonce,
        })
    }
}

/// A transaction whose contents were disclosed during the reveal phase.
///
/// Only constructed by the batch aggregate after the binding check
/// succeeded, so the digest here always matches the stored commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedTransaction {
    /// Digest of the commitment this reveal satisfies.
    pub commitment_digest: CommitmentDigest,
    /// The disclosed payload.
    pub transaction: TransactionData,
    /// The revealing user's address.
    pub user_address: Address,
    /// When the reveal was accepted.
    pub revealed_at: Timestamp,
    /// The reveal nonce that completed the binding.
    pub nonce: String,
}
