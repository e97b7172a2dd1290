//! Use-case request and response payloads.
//!
//! Requests arrive with wire-shaped fields (hex strings, decimal
//! amounts); `validate` turns them into domain values or a typed
//! rejection. Responses are the success halves of the envelope.

use crate::application::envelope::{UseCaseError, UseCaseResult};
use crate::domain::batch::{BatchParams, BatchStatus};
use crate::domain::errors::DomainError;
use crate::ports::outbound::TxReceipt;
use fairbatch_types::{
    parse_address, parse_digest, Address, BatchId, Commitment, CommitmentDigest, MevMetrics,
    OrderingMethod, Timestamp, TransactionData, ValidationError, MIN_NONCE_LEN,
};
use serde::{Deserialize, Serialize};

/// Request to open a new batch auction round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    /// When the round opens.
    pub start_time: Timestamp,
    /// When the round closes.
    pub end_time: Timestamp,
    /// Ordering strategy to record on the batch.
    pub ordering_method: OrderingMethod,
    /// Commitment window override, in minutes.
    pub commitment_duration_mins: Option<u64>,
    /// Reveal window override, in minutes.
    pub reveal_duration_mins: Option<u64>,
}

impl CreateBatchRequest {
    /// Resolve into aggregate parameters, falling back to the configured
    /// default windows.
    pub fn to_params(&self, default_commitment_mins: u64, default_reveal_mins: u64) -> BatchParams {
        BatchParams {
            start_time: self.start_time,
            end_time: self.end_time,
            ordering_method: self.ordering_method,
            commitment_duration_mins: self
                .commitment_duration_mins
                .unwrap_or(default_commitment_mins),
            reveal_duration_mins: self.reveal_duration_mins.unwrap_or(default_reveal_mins),
        }
    }
}

/// Success payload of `CreateBatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchResponse {
    pub batch_id: BatchId,
    pub status: BatchStatus,
    pub receipt: TxReceipt,
}

/// Request to record a commitment in the active batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCommitmentRequest {
    /// Committing user, `0x` + 40 hex chars.
    pub user_address: String,
    /// Commitment digest, `0x` + 64 hex chars.
    pub commitment_hash: String,
    /// Optional early disclosure of the reveal nonce.
    pub nonce: Option<String>,
}

impl SubmitCommitmentRequest {
    /// Parse and validate into a [`Commitment`] stamped at `now`.
    pub fn validate(&self, now: Timestamp) -> UseCaseResult<Commitment> {
        let invalid = |err: ValidationError| UseCaseError::from(DomainError::InvalidCommitment(err));

        let user_address = parse_address(&self.user_address).map_err(invalid)?;
        let digest = parse_digest(&self.commitment_hash).map_err(invalid)?;
        Commitment::new(digest, user_address, now, self.nonce.clone(), now).map_err(invalid)
    }
}

/// Success payload of `SubmitCommitment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitCommitmentResponse {
    pub batch_id: BatchId,
    pub user_address: Address,
    pub commitment_hash: CommitmentDigest,
    pub commitment_count: u64,
    pub receipt: TxReceipt,
}

/// Request to reveal a previously committed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealTransactionRequest {
    /// Revealing user, `0x` + 40 hex chars.
    pub user_address: String,
    /// The digest being revealed, `0x` + 64 hex chars.
    pub commitment_hash: String,
    /// Transaction recipient, `0x` + 40 hex chars.
    pub to: String,
    /// Transfer amount in wei, decimal string.
    pub value: String,
    /// Call data.
    pub data: Vec<u8>,
    /// Gas limit, strictly positive.
    pub gas_limit: u64,
    /// Gas price in wei, decimal string, strictly positive.
    pub gas_price: String,
    /// Sender account nonce.
    pub tx_nonce: u64,
    /// Reveal nonce, at least ten characters.
    pub reveal_nonce: String,
}

/// A reveal request after validation.
#[derive(Debug, Clone)]
pub struct RevealInput {
    pub user_address: Address,
    pub digest: CommitmentDigest,
    pub transaction: TransactionData,
    pub nonce: String,
}

impl RevealTransactionRequest {
    /// Parse and validate into domain values.
    pub fn validate(&self) -> UseCaseResult<RevealInput> {
        if self.reveal_nonce.len() < MIN_NONCE_LEN {
            return Err(ValidationError::NonceTooShort {
                len: self.reveal_nonce.len(),
                min: MIN_NONCE_LEN,
            }
            .into());
        }

        let user_address = parse_address(&self.user_address)?;
        let digest = parse_digest(&self.commitment_hash)?;
        let to = parse_address(&self.to)?;
        let value = TransactionData::parse_amount(&self.value)?;
        let gas_price = TransactionData::parse_amount(&self.gas_price)?;
        let transaction = TransactionData::new(
            to,
            value,
            self.data.clone(),
            self.gas_limit,
            gas_price,
            self.tx_nonce,
        )?;

        Ok(RevealInput {
            user_address,
            digest,
            transaction,
            nonce: self.reveal_nonce.clone(),
        })
    }
}

/// Success payload of `RevealTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealTransactionResponse {
    pub batch_id: BatchId,
    pub commitment_hash: CommitmentDigest,
    pub revealed_count: u64,
    pub receipt: TxReceipt,
}

/// The transition `AdvanceBatchPhase` should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTransition {
    /// `COMMITMENT_PHASE --> REVEAL_PHASE`
    ToReveal,
    /// `REVEAL_PHASE --> EXECUTION_PHASE`
    ToExecution,
}

/// Request to advance a batch's recorded phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceBatchPhaseRequest {
    /// Target batch; the currently active batch when omitted.
    pub batch_id: Option<BatchId>,
    /// Which transition to perform.
    pub transition: PhaseTransition,
}

/// Success payload of `AdvanceBatchPhase`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceBatchPhaseResponse {
    pub batch_id: BatchId,
    pub from: BatchStatus,
    pub to: BatchStatus,
}

/// MEV accounting as it arrives on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MevMetricsRequest {
    /// Extractable value left in the final ordering, wei decimal string.
    pub extracted_value: String,
    /// Estimated user savings, wei decimal string.
    pub savings_generated: String,
    /// Transactions included in the batch.
    pub total_transactions: u64,
    /// Transactions that executed successfully.
    pub successful_transactions: u64,
    /// Mean gas price across the batch, wei decimal string.
    pub average_gas_price: String,
    /// Total gas consumed, decimal string.
    pub total_gas_used: String,
}

impl MevMetricsRequest {
    /// Parse and validate into [`MevMetrics`].
    pub fn validate(&self) -> UseCaseResult<MevMetrics> {
        let metrics = MevMetrics::new(
            TransactionData::parse_amount(&self.extracted_value)?,
            TransactionData::parse_amount(&self.savings_generated)?,
            self.total_transactions,
            self.successful_transactions,
            TransactionData::parse_amount(&self.average_gas_price)?,
            TransactionData::parse_amount(&self.total_gas_used)?,
        )?;
        Ok(metrics)
    }
}

/// Request to finalize a batch with an externally computed ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeBatchRequest {
    /// Target batch; the currently active batch when omitted.
    pub batch_id: Option<BatchId>,
    /// Final ordering as `0x`-prefixed digests.
    pub ordering: Vec<String>,
    /// MEV accounting for the batch.
    pub metrics: MevMetricsRequest,
}

/// A finalize request after validation.
#[derive(Debug, Clone)]
pub struct FinalizeInput {
    pub ordering: Vec<CommitmentDigest>,
    pub metrics: MevMetrics,
}

impl FinalizeBatchRequest {
    /// Parse the ordering digests and validate the metrics.
    pub fn validate(&self) -> UseCaseResult<FinalizeInput> {
        let ordering = self
            .ordering
            .iter()
            .map(|raw| parse_digest(raw).map_err(UseCaseError::from))
            .collect::<UseCaseResult<Vec<_>>>()?;
        let metrics = self.metrics.validate()?;

        Ok(FinalizeInput { ordering, metrics })
    }
}

/// Success payload of `FinalizeBatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeBatchResponse {
    pub batch_id: BatchId,
    pub total_transactions: u64,
    pub reveal_rate: f64,
    pub receipt: TxReceipt,
}

/// Success payload of `CancelBatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBatchResponse {
    pub batch_id: BatchId,
    pub previous_status: BatchStatus,
}
