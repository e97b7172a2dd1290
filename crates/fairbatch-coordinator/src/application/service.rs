//! Use-case orchestration.
//!
//! Every operation follows the same skeleton: validate the request, load
//! the target batch, invoke the aggregate, mirror the effect on-chain via
//! the bridge, persist, then dispatch the drained domain events.
//!
//! Failure discipline:
//! - on bridge failure the in-memory mutation is discarded and the bridge
//!   error surfaces verbatim; nothing is persisted
//! - a persist failure after a successful bridge call is
//!   `PERSISTENCE_AFTER_COMMIT`, a recoverable inconsistency the operator
//!   reconciles through the bridge's query methods
//!
//! Operations against the same batch are serialized behind a per-batch
//! async mutex around the load–mutate–mirror–save window; the pure
//! aggregate calls inside never suspend.

use crate::adapters::dispatcher::EventDispatcher;
use crate::application::envelope::{ErrorCode, UseCaseError, UseCaseResult};
use crate::application::requests::{
    AdvanceBatchPhaseRequest, AdvanceBatchPhaseResponse, CancelBatchResponse, CreateBatchRequest,
    CreateBatchResponse, FinalizeBatchRequest, FinalizeBatchResponse, PhaseTransition,
    RevealTransactionRequest, RevealTransactionResponse, SubmitCommitmentRequest,
    SubmitCommitmentResponse,
};
use crate::config::CoordinatorConfig;
use crate::domain::batch::Batch;
use crate::metrics::Metrics;
use crate::ports::inbound::BatchCoordinatorApi;
use crate::ports::outbound::{BatchRepository, BlockchainBridge, Clock};
use async_trait::async_trait;
use fairbatch_types::{BatchId, Timestamp};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// The coordinator's application service.
pub struct CoordinatorService {
    repository: Arc<dyn BatchRepository>,
    bridge: Arc<dyn BlockchainBridge>,
    clock: Arc<dyn Clock>,
    dispatcher: Arc<EventDispatcher>,
    metrics: Arc<Metrics>,
    config: CoordinatorConfig,
    locks: Mutex<HashMap<BatchId, Arc<tokio::sync::Mutex<()>>>>,
}

impl CoordinatorService {
    pub fn new(
        repository: Arc<dyn BatchRepository>,
        bridge: Arc<dyn BlockchainBridge>,
        clock: Arc<dyn Clock>,
        dispatcher: Arc<EventDispatcher>,
        metrics: Arc<Metrics>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            repository,
            bridge,
            clock,
            dispatcher,
            metrics,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The mutex serializing operations on one batch.
    fn lock_for(&self, id: BatchId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    async fn load_active(&self, now: Timestamp) -> UseCaseResult<Batch> {
        self.repository
            .current_active_batch(now)
            .await?
            .ok_or_else(UseCaseError::no_active_batch)
    }

    /// Resolve the target batch: the named one, or the currently active one.
    async fn resolve_target(
        &self,
        batch_id: Option<BatchId>,
        now: Timestamp,
    ) -> UseCaseResult<BatchId> {
        match batch_id {
            Some(id) => Ok(self.repository.get(id).await?.id()),
            None => Ok(self.load_active(now).await?.id()),
        }
    }

    /// Persist a batch whose effect is already mirrored on-chain.
    async fn persist_after_commit(&self, batch: &Batch) -> UseCaseResult<()> {
        if let Err(err) = self.repository.save(batch).await {
            self.metrics.record_persistence_failure();
            error!(
                batch_id = %batch.id(),
                error = %err,
                "Batch mutated on-chain but could not be persisted"
            );
            return Err(UseCaseError::new(
                ErrorCode::PersistenceAfterCommit,
                format!(
                    "Batch {} was mirrored on-chain but not persisted: {err}",
                    batch.id()
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BatchCoordinatorApi for CoordinatorService {
    async fn create_batch(
        &self,
        request: CreateBatchRequest,
    ) -> UseCaseResult<CreateBatchResponse> {
        let now = self.clock.now();
        let params = request.to_params(
            self.config.commitment_duration_mins,
            self.config.reveal_duration_mins,
        );

        let mut batch = Batch::create(params, now)?;
        let events = batch.take_events();

        let receipt = match self
            .bridge
            .create_new_batch(batch.id(), batch.start_time(), batch.end_time())
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.metrics.record_bridge_failure();
                warn!(batch_id = %batch.id(), error = %err, "Batch creation not mirrored on-chain");
                return Err(err.into());
            }
        };

        self.persist_after_commit(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_batch_created();
        info!(
            batch_id = %batch.id(),
            start_time = batch.start_time(),
            end_time = batch.end_time(),
            method = %batch.ordering_method(),
            "Batch created"
        );

        Ok(CreateBatchResponse {
            batch_id: batch.id(),
            status: batch.status(),
            receipt,
        })
    }

    async fn submit_commitment(
        &self,
        request: SubmitCommitmentRequest,
    ) -> UseCaseResult<SubmitCommitmentResponse> {
        let now = self.clock.now();
        let commitment = request.validate(now)?;

        let active_id = self.load_active(now).await?.id();
        let lock = self.lock_for(active_id);
        let _guard = lock.lock().await;

        let mut batch = self.repository.get(active_id).await?;
        if let Err(err) = batch.add_commitment(commitment.clone(), now) {
            self.metrics.record_commitment_rejected();
            return Err(err.into());
        }
        let events = batch.take_events();

        let receipt = match self
            .bridge
            .submit_commitment(batch.id(), commitment.user_address, commitment.digest)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.metrics.record_bridge_failure();
                warn!(batch_id = %batch.id(), error = %err, "Commitment not mirrored on-chain");
                return Err(err.into());
            }
        };

        self.persist_after_commit(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_commitment_accepted();
        info!(
            batch_id = %batch.id(),
            user = %commitment.user_address,
            count = batch.commitment_count(),
            "Commitment recorded"
        );

        Ok(SubmitCommitmentResponse {
            batch_id: batch.id(),
            user_address: commitment.user_address,
            commitment_hash: commitment.digest,
            commitment_count: batch.commitment_count() as u64,
            receipt,
        })
    }

    async fn reveal_transaction(
        &self,
        request: RevealTransactionRequest,
    ) -> UseCaseResult<RevealTransactionResponse> {
        let now = self.clock.now();
        let input = request.validate()?;

        let active_id = self.load_active(now).await?.id();
        let lock = self.lock_for(active_id);
        let _guard = lock.lock().await;

        let mut batch = self.repository.get(active_id).await?;
        if let Err(err) = batch.reveal_transaction(
            input.digest,
            input.transaction.clone(),
            input.user_address,
            &input.nonce,
            now,
        ) {
            self.metrics.record_reveal_rejected();
            return Err(err.into());
        }
        let events = batch.take_events();

        let receipt = match self
            .bridge
            .reveal_transaction(batch.id(), input.user_address, &input.transaction, &input.nonce)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.metrics.record_bridge_failure();
                warn!(batch_id = %batch.id(), error = %err, "Reveal not mirrored on-chain");
                return Err(err.into());
            }
        };

        self.persist_after_commit(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_reveal_accepted();
        info!(
            batch_id = %batch.id(),
            user = %input.user_address,
            revealed = batch.revealed_count(),
            "Transaction revealed"
        );

        Ok(RevealTransactionResponse {
            batch_id: batch.id(),
            commitment_hash: input.digest,
            revealed_count: batch.revealed_count() as u64,
            receipt,
        })
    }

    async fn advance_batch_phase(
        &self,
        request: AdvanceBatchPhaseRequest,
    ) -> UseCaseResult<AdvanceBatchPhaseResponse> {
        let now = self.clock.now();
        let target_id = self.resolve_target(request.batch_id, now).await?;
        let lock = self.lock_for(target_id);
        let _guard = lock.lock().await;

        let mut batch = self.repository.get(target_id).await?;
        let from = batch.status();
        match request.transition {
            PhaseTransition::ToReveal => batch.advance_to_reveal(now)?,
            PhaseTransition::ToExecution => batch.advance_to_execution(now)?,
        }
        let to = batch.status();
        let events = batch.take_events();

        // phase is deadline-derived on-chain; there is no bridge call to mirror
        self.repository.save(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_phase_advance();
        info!(batch_id = %batch.id(), from = %from, to = %to, "Batch phase advanced");

        Ok(AdvanceBatchPhaseResponse {
            batch_id: batch.id(),
            from,
            to,
        })
    }

    async fn finalize_batch(
        &self,
        request: FinalizeBatchRequest,
    ) -> UseCaseResult<FinalizeBatchResponse> {
        let now = self.clock.now();
        let input = request.validate()?;

        let target_id = self.resolve_target(request.batch_id, now).await?;
        let lock = self.lock_for(target_id);
        let _guard = lock.lock().await;

        let mut batch = self.repository.get(target_id).await?;
        batch.finalize(input.ordering, input.metrics.clone(), now)?;
        let events = batch.take_events();

        let receipt = match self
            .bridge
            .finalize_batch(batch.id(), batch.final_ordering())
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.metrics.record_bridge_failure();
                warn!(batch_id = %batch.id(), error = %err, "Finalization not mirrored on-chain");
                return Err(err.into());
            }
        };

        self.persist_after_commit(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_batch_finalized();
        info!(
            batch_id = %batch.id(),
            transactions = input.metrics.total_transactions,
            reveal_rate = batch.reveal_rate(),
            "Batch finalized"
        );

        Ok(FinalizeBatchResponse {
            batch_id: batch.id(),
            total_transactions: input.metrics.total_transactions,
            reveal_rate: batch.reveal_rate(),
            receipt,
        })
    }

    async fn cancel_batch(&self, batch_id: BatchId) -> UseCaseResult<CancelBatchResponse> {
        let now = self.clock.now();
        let lock = self.lock_for(batch_id);
        let _guard = lock.lock().await;

        let mut batch = self.repository.get(batch_id).await?;
        let previous_status = batch.status();
        batch.cancel(now)?;
        let events = batch.take_events();

        // cancellation is off-chain bookkeeping; no bridge call to mirror
        self.repository.save(&batch).await?;
        self.dispatcher.dispatch(&events);
        self.metrics.record_batch_cancelled();
        info!(batch_id = %batch.id(), from = %previous_status, "Batch cancelled");

        Ok(CancelBatchResponse {
            batch_id: batch.id(),
            previous_status,
        })
    }
}
