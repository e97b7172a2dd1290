//! Error types for the batch aggregate.

use super::batch::BatchStatus;
use fairbatch_types::{Address, ValidationError};
use thiserror::Error;

/// All rejections an aggregate operation can return.
///
/// Every aggregate entry point is total: a violated precondition comes
/// back as one of these values, never as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Batch creation parameters are temporally inconsistent.
    #[error("Invalid batch timing: {reason}")]
    InvalidBatchTiming { reason: String },

    /// Operation requires a specific recorded status.
    #[error("Invalid batch status: expected {expected}, got {actual}")]
    InvalidStatus {
        expected: BatchStatus,
        actual: BatchStatus,
    },

    /// Commitment arrived outside the commitment window.
    #[error("Batch is not in commitment phase")]
    CommitmentPhaseNotActive,

    /// The user already holds a commitment in this batch.
    #[error("Commitment already exists for user {user}")]
    CommitmentAlreadyExists { user: Address },

    /// Commitment value object failed validation.
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(ValidationError),

    /// Reveal arrived outside the reveal window.
    #[error("Batch is not in reveal phase")]
    RevealPhaseNotActive,

    /// No commitment matches the revealing user and digest.
    #[error("No matching commitment for user {user}")]
    NoMatchingCommitment { user: Address },

    /// Recomputed digest disagrees with the stored commitment.
    #[error("Revealed transaction does not match commitment")]
    RevealMismatch,

    /// Finalization ordering is not a permutation of the revealed set.
    #[error("Invalid final ordering: {reason}")]
    InvalidOrdering { reason: String },

    /// Operation requires a non-terminal batch.
    #[error("Batch is already {actual}")]
    TerminalStatus { actual: BatchStatus },
}
