//! Mock blockchain bridge.
//!
//! Stands in for the on-chain protocol contract during development and
//! testing: records every call, keeps per-batch contract state, can be
//! scripted to fail, and emits [`ChainEvent`]s while listening is active.
//! Receipt transaction hashes are synthesized with keccak-256, the same
//! primitive the real contract uses.

use crate::ports::outbound::{
    BlockchainBridge, BridgeError, ChainEvent, ChainLog, OnChainBatch, ReceiptStatus, TxReceipt,
};
use async_trait::async_trait;
use fairbatch_crypto::keccak256;
use fairbatch_types::{Address, BatchId, CommitmentDigest, Timestamp, TransactionData, U256};
use parking_lot::Mutex;
use primitive_types::H256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// A recorded bridge invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    CreateNewBatch {
        batch_id: BatchId,
    },
    SubmitCommitment {
        batch_id: BatchId,
        user_address: Address,
        digest: CommitmentDigest,
    },
    RevealTransaction {
        batch_id: BatchId,
        user_address: Address,
        nonce: String,
    },
    FinalizeBatch {
        batch_id: BatchId,
        ordering_len: usize,
    },
}

/// In-memory contract double.
pub struct MockBlockchainBridge {
    calls: Mutex<Vec<BridgeCall>>,
    fail_next: Mutex<Option<BridgeError>>,
    batches: Mutex<HashMap<BatchId, OnChainBatch>>,
    commitments: Mutex<HashMap<(BatchId, Address), CommitmentDigest>>,
    active_batch: Mutex<Option<BatchId>>,
    next_block: AtomicU64,
    listening: AtomicBool,
    events: broadcast::Sender<ChainEvent>,
}

impl Default for MockBlockchainBridge {
    fn default() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            batches: Mutex::new(HashMap::new()),
            commitments: Mutex::new(HashMap::new()),
            active_batch: Mutex::new(None),
            next_block: AtomicU64::new(1),
            listening: AtomicBool::new(false),
            events,
        }
    }
}

impl MockBlockchainBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write operation fail with `error`.
    pub fn fail_next_with(&self, error: BridgeError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Everything invoked so far, in call order.
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().clone()
    }

    fn take_scripted_failure(&self) -> Option<BridgeError> {
        self.fail_next.lock().take()
    }

    fn receipt(&self, op: &str, batch_id: BatchId) -> TxReceipt {
        let block_number = self.next_block.fetch_add(1, Ordering::SeqCst);

        let mut preimage = Vec::with_capacity(op.len() + 16 + 8);
        preimage.extend_from_slice(op.as_bytes());
        preimage.extend_from_slice(batch_id.as_uuid().as_bytes());
        preimage.extend_from_slice(&block_number.to_be_bytes());

        TxReceipt {
            transaction_hash: H256::from(keccak256(&preimage)),
            block_number,
            gas_used: U256::from(60_000u64),
            status: ReceiptStatus::Success,
        }
    }

    fn emit(&self, event: ChainEvent) {
        if !self.listening.load(Ordering::SeqCst) {
            return;
        }
        // no receivers is fine
        let _ = self.events.send(event);
    }

    fn log_for(&self, receipt: &TxReceipt) -> ChainLog {
        ChainLog {
            block_number: receipt.block_number,
            transaction_hash: receipt.transaction_hash,
            log_index: 0,
        }
    }
}

#[async_trait]
impl BlockchainBridge for MockBlockchainBridge {
    async fn create_new_batch(
        &self,
        batch_id: BatchId,
        _start_time: Timestamp,
        _end_time: Timestamp,
    ) -> Result<TxReceipt, BridgeError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        self.calls.lock().push(BridgeCall::CreateNewBatch { batch_id });
        self.batches.lock().insert(
            batch_id,
            OnChainBatch {
                batch_id,
                commitment_count: 0,
                reveal_count: 0,
                finalized: false,
            },
        );
        *self.active_batch.lock() = Some(batch_id);

        debug!(batch_id = %batch_id, "Mock bridge: batch created");
        Ok(self.receipt("createNewBatch", batch_id))
    }

    async fn submit_commitment(
        &self,
        batch_id: BatchId,
        user_address: Address,
        digest: CommitmentDigest,
    ) -> Result<TxReceipt, BridgeError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        self.calls.lock().push(BridgeCall::SubmitCommitment {
            batch_id,
            user_address,
            digest,
        });
        self.commitments
            .lock()
            .insert((batch_id, user_address), digest);
        if let Some(batch) = self.batches.lock().get_mut(&batch_id) {
            batch.commitment_count += 1;
        }

        let receipt = self.receipt("submitCommitment", batch_id);
        self.emit(ChainEvent::CommitmentSubmitted {
            log: self.log_for(&receipt),
            batch_id,
            user_address,
            digest,
        });
        Ok(receipt)
    }

    async fn reveal_transaction(
        &self,
        batch_id: BatchId,
        user_address: Address,
        transaction: &TransactionData,
        nonce: &str,
    ) -> Result<TxReceipt, BridgeError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        self.calls.lock().push(BridgeCall::RevealTransaction {
            batch_id,
            user_address,
            nonce: nonce.to_string(),
        });
        if let Some(batch) = self.batches.lock().get_mut(&batch_id) {
            batch.reveal_count += 1;
        }

        // the contract hashes the revealed blob with keccak-256
        let mut blob = transaction.canonical_bytes();
        blob.extend_from_slice(nonce.as_bytes());
        let digest = CommitmentDigest::from(keccak256(&blob));

        let receipt = self.receipt("revealTransaction", batch_id);
        self.emit(ChainEvent::TransactionRevealed {
            log: self.log_for(&receipt),
            batch_id,
            user_address,
            digest,
        });
        Ok(receipt)
    }

    async fn finalize_batch(
        &self,
        batch_id: BatchId,
        ordering: &[CommitmentDigest],
    ) -> Result<TxReceipt, BridgeError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        self.calls.lock().push(BridgeCall::FinalizeBatch {
            batch_id,
            ordering_len: ordering.len(),
        });
        if let Some(batch) = self.batches.lock().get_mut(&batch_id) {
            batch.finalized = true;
        }
        let mut active = self.active_batch.lock();
        if *active == Some(batch_id) {
            *active = None;
        }
        drop(active);

        let receipt = self.receipt("finalizeBatch", batch_id);
        self.emit(ChainEvent::BatchFinalized {
            log: self.log_for(&receipt),
            batch_id,
            ordering: ordering.to_vec(),
        });
        Ok(receipt)
    }

    async fn batch_data(&self, batch_id: BatchId) -> Result<Option<OnChainBatch>, BridgeError> {
        Ok(self.batches.lock().get(&batch_id).cloned())
    }

    async fn current_active_batch_id(&self) -> Result<Option<BatchId>, BridgeError> {
        Ok(*self.active_batch.lock())
    }

    async fn commitment_digest(
        &self,
        batch_id: BatchId,
        user_address: Address,
    ) -> Result<Option<CommitmentDigest>, BridgeError> {
        Ok(self
            .commitments
            .lock()
            .get(&(batch_id, user_address))
            .copied())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.events.subscribe()
    }

    async fn start_event_listening(&self) -> Result<(), BridgeError> {
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_event_listening(&self) -> Result<(), BridgeError> {
        self.listening.store(false, Ordering::SeqCst);
        Ok(())
    }
}
