//! # Inbound Ports (Driving Ports / API)
//!
//! The use-case surface the coordinator exposes to hosts (HTTP layer,
//! schedulers, operator tooling). Every operation resolves to the uniform
//! result envelope; nothing here panics on client input.

use crate::application::envelope::UseCaseResult;
use crate::application::requests::{
    AdvanceBatchPhaseRequest, AdvanceBatchPhaseResponse, CancelBatchResponse, CreateBatchRequest,
    CreateBatchResponse, FinalizeBatchRequest, FinalizeBatchResponse, RevealTransactionRequest,
    RevealTransactionResponse, SubmitCommitmentRequest, SubmitCommitmentResponse,
};
use async_trait::async_trait;
use fairbatch_types::BatchId;

/// The coordinator's use-case API.
#[async_trait]
pub trait BatchCoordinatorApi: Send + Sync {
    /// Open a new batch and mirror it on-chain.
    async fn create_batch(&self, request: CreateBatchRequest)
        -> UseCaseResult<CreateBatchResponse>;

    /// Record a commitment in the currently active batch.
    async fn submit_commitment(
        &self,
        request: SubmitCommitmentRequest,
    ) -> UseCaseResult<SubmitCommitmentResponse>;

    /// Verify and record a reveal in the currently active batch.
    async fn reveal_transaction(
        &self,
        request: RevealTransactionRequest,
    ) -> UseCaseResult<RevealTransactionResponse>;

    /// Advance a batch's recorded phase to catch up with its deadlines.
    async fn advance_batch_phase(
        &self,
        request: AdvanceBatchPhaseRequest,
    ) -> UseCaseResult<AdvanceBatchPhaseResponse>;

    /// Finalize a batch with an externally supplied ordering.
    async fn finalize_batch(
        &self,
        request: FinalizeBatchRequest,
    ) -> UseCaseResult<FinalizeBatchResponse>;

    /// Administratively cancel a batch.
    async fn cancel_batch(&self, batch_id: BatchId) -> UseCaseResult<CancelBatchResponse>;
}
