//! Uniform result envelope for use-case boundaries.
//!
//! Aggregate methods never throw across this boundary: every failure is
//! folded into a [`UseCaseError`] with a stable [`ErrorCode`] and a
//! human-readable message. The JSON rendering is
//! `{"ok": true, "value": …}` / `{"ok": false, "error": {code, message}}`.

use crate::domain::errors::DomainError;
use crate::ports::outbound::{BridgeError, RepositoryError};
use fairbatch_types::ValidationError;
use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable error identifiers.
///
/// The external API layer maps these mechanically; the HTTP status class
/// is carried alongside so that mapping stays in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum ErrorCode {
    // Domain
    BatchNotFound,
    InvalidBatchStatus,
    CommitmentAlreadyExists,
    InvalidCommitment,
    InvalidArgument,
    RevealPhaseNotActive,
    NoMatchingCommitment,
    TransactionRevealMismatch,
    NoActiveBatch,
    // Infrastructure
    PersistenceAfterCommit,
    BlockchainConnectionError,
    ContractInteractionError,
    DatabaseError,
    CacheError,
    // Application
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    RateLimitError,
}

impl ErrorCode {
    /// Stable wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchNotFound => "BATCH_NOT_FOUND",
            Self::InvalidBatchStatus => "INVALID_BATCH_STATUS",
            Self::CommitmentAlreadyExists => "COMMITMENT_ALREADY_EXISTS",
            Self::InvalidCommitment => "INVALID_COMMITMENT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::RevealPhaseNotActive => "REVEAL_PHASE_NOT_ACTIVE",
            Self::NoMatchingCommitment => "NO_MATCHING_COMMITMENT",
            Self::TransactionRevealMismatch => "TRANSACTION_REVEAL_MISMATCH",
            Self::NoActiveBatch => "NO_ACTIVE_BATCH",
            Self::PersistenceAfterCommit => "PERSISTENCE_AFTER_COMMIT",
            Self::BlockchainConnectionError => "BLOCKCHAIN_CONNECTION_ERROR",
            Self::ContractInteractionError => "CONTRACT_INTERACTION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CacheError => "CACHE_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::AuthorizationError => "AUTHORIZATION_ERROR",
            Self::RateLimitError => "RATE_LIMIT_ERROR",
        }
    }

    /// HTTP status the external API layer should respond with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BatchNotFound
            | Self::InvalidBatchStatus
            | Self::CommitmentAlreadyExists
            | Self::InvalidCommitment
            | Self::InvalidArgument
            | Self::RevealPhaseNotActive
            | Self::NoMatchingCommitment
            | Self::TransactionRevealMismatch
            | Self::NoActiveBatch
            | Self::ValidationError => 400,
            Self::AuthenticationError => 401,
            Self::AuthorizationError => 403,
            Self::RateLimitError => 429,
            Self::PersistenceAfterCommit
            | Self::BlockchainConnectionError
            | Self::ContractInteractionError
            | Self::DatabaseError
            | Self::CacheError => 500,
        }
    }
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        code.as_str()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A use-case failure: stable code plus a readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{code}: {message}")]
pub struct UseCaseError {
    /// Stable identifier.
    pub code: ErrorCode,
    /// Human-readable description. Never contains a stack trace.
    pub message: String,
}

impl UseCaseError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The well-known "no batch is currently active" failure.
    pub fn no_active_batch() -> Self {
        Self::new(ErrorCode::NoActiveBatch, "No batch is currently active")
    }
}

/// Result of a use-case invocation.
pub type UseCaseResult<T> = Result<T, UseCaseError>;

impl From<DomainError> for UseCaseError {
    fn from(err: DomainError) -> Self {
        let code = match &err {
            DomainError::InvalidBatchTiming { .. } | DomainError::InvalidOrdering { .. } => {
                ErrorCode::InvalidArgument
            }
            DomainError::InvalidStatus { .. }
            | DomainError::CommitmentPhaseNotActive
            | DomainError::TerminalStatus { .. } => ErrorCode::InvalidBatchStatus,
            DomainError::CommitmentAlreadyExists { .. } => ErrorCode::CommitmentAlreadyExists,
            DomainError::InvalidCommitment(_) => ErrorCode::InvalidCommitment,
            DomainError::RevealPhaseNotActive => ErrorCode::RevealPhaseNotActive,
            DomainError::NoMatchingCommitment { .. } => ErrorCode::NoMatchingCommitment,
            DomainError::RevealMismatch => ErrorCode::TransactionRevealMismatch,
        };
        Self::new(code, err.to_string())
    }
}

impl From<RepositoryError> for UseCaseError {
    fn from(err: RepositoryError) -> Self {
        let code = match &err {
            RepositoryError::NotFound(_) => ErrorCode::BatchNotFound,
            RepositoryError::Storage(_) => ErrorCode::DatabaseError,
        };
        Self::new(code, err.to_string())
    }
}

impl From<BridgeError> for UseCaseError {
    fn from(err: BridgeError) -> Self {
        let code = match &err {
            BridgeError::Connection(_) => ErrorCode::BlockchainConnectionError,
            BridgeError::Contract(_) => ErrorCode::ContractInteractionError,
        };
        Self::new(code, err.to_string())
    }
}

impl From<ValidationError> for UseCaseError {
    fn from(err: ValidationError) -> Self {
        Self::new(ErrorCode::ValidationError, err.to_string())
    }
}

/// Render a use-case result as the wire envelope.
pub fn to_envelope<T: Serialize>(result: &UseCaseResult<T>) -> serde_json::Value {
    match result {
        Ok(value) => serde_json::json!({ "ok": true, "value": value }),
        Err(err) => serde_json::json!({
            "ok": false,
            "error": { "code": err.code.as_str(), "message": err.message },
        }),
    }
}
