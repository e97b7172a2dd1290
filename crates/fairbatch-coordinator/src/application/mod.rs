//! Application layer: use-case orchestration and the result envelope.

pub mod envelope;
pub mod requests;
pub mod service;

pub use envelope::{to_envelope, ErrorCode, UseCaseError, UseCaseResult};
pub use requests::{
    AdvanceBatchPhaseRequest, AdvanceBatchPhaseResponse, CancelBatchResponse, CreateBatchRequest,
    CreateBatchResponse, FinalizeBatchRequest, FinalizeBatchResponse, FinalizeInput,
    MevMetricsRequest, PhaseTransition, RevealInput, RevealTransactionRequest,
    RevealTransactionResponse, SubmitCommitmentRequest, SubmitCommitmentResponse,
};
pub use service::CoordinatorService;
