//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the coordinator requires the host application to provide:
//! durable batch storage, the on-chain protocol contract, and a clock.
//!
//! In-tree implementations for development and testing live in
//! `crate::adapters`; production adapters (a SQL repository, an RPC
//! bridge) belong to the host.

use crate::domain::batch::{Batch, BatchStatus};
use async_trait::async_trait;
use fairbatch_types::{
    Address, BatchId, CommitmentDigest, OrderingMethod, Timestamp, TransactionData, U256,
};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

// =============================================================================
// CLOCK
// =============================================================================

/// Abstract time source.
///
/// Every temporal decision in the core flows through this port, which is
/// what makes the deadline-driven phase logic testable under a frozen
/// clock.
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source for production.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable time source for tests.
pub struct FixedClock {
    now: std::sync::atomic::AtomicU64,
}

impl FixedClock {
    /// Freeze the clock at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: std::sync::atomic::AtomicU64::new(now),
        }
    }

    /// Move the frozen clock.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, std::sync::atomic::Ordering::SeqCst);
    }

    /// Advance the frozen clock by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

// =============================================================================
// BATCH REPOSITORY
// =============================================================================

/// Errors from the storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No batch with this id.
    #[error("Batch not found: {0}")]
    NotFound(BatchId),

    /// The underlying store failed.
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Filters for paginated batch listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFilter {
    /// Keep only batches in this status.
    pub status: Option<BatchStatus>,
    /// Keep only batches using this ordering method.
    pub ordering_method: Option<OrderingMethod>,
    /// Keep only batches created at or after this time.
    pub date_from: Option<Timestamp>,
    /// Keep only batches created at or before this time.
    pub date_to: Option<Timestamp>,
}

/// One page of a batch listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
    /// Total page count, `ceil(total / limit)`.
    pub pages: usize,
}

/// Aggregated statistics over batches created in a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Batches created in the range.
    pub total_batches: u64,
    /// Of those, batches that completed.
    pub completed_batches: u64,
    /// Mean commitments per batch.
    pub average_commitments: f64,
    /// Mean reveal rate, in percent.
    pub average_reveal_rate: f64,
    /// Total MEV extracted across completed batches, in wei.
    pub total_mev_extracted: U256,
    /// Total savings across completed batches, in wei.
    pub total_savings_generated: U256,
}

/// Abstract interface over durable batch storage and queries.
///
/// Implementations must offer at least read-your-writes consistency per
/// batch id; loads return owned snapshots, never shared references.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Persist a batch, inserting or replacing.
    async fn save(&self, batch: &Batch) -> Result<(), RepositoryError>;

    /// Load a batch by id.
    async fn find_by_id(&self, id: BatchId) -> Result<Option<Batch>, RepositoryError>;

    /// Load a batch by id, failing with `NotFound` when absent.
    async fn get(&self, id: BatchId) -> Result<Batch, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    /// Remove a batch; returns whether it existed.
    async fn delete(&self, id: BatchId) -> Result<bool, RepositoryError>;

    /// The unique non-terminal batch whose `[start, end)` window contains
    /// `now`; ties resolved toward the latest start time.
    async fn current_active_batch(&self, now: Timestamp)
        -> Result<Option<Batch>, RepositoryError>;

    /// All batches with the given recorded status.
    async fn find_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>, RepositoryError>;

    /// The most recently created batches, newest first.
    async fn find_recent(&self, limit: usize) -> Result<Vec<Batch>, RepositoryError>;

    /// Batches created inside `[from, to]`.
    async fn find_in_date_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Batch>, RepositoryError>;

    /// Filtered, paginated listing; newest first. Pages are 1-based.
    async fn find_paginated(
        &self,
        page: usize,
        limit: usize,
        filter: BatchFilter,
    ) -> Result<Page<Batch>, RepositoryError>;

    /// Aggregate statistics over batches created inside `[from, to]`.
    async fn statistics(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<BatchStatistics, RepositoryError>;

    /// Whether a batch with this id exists.
    async fn exists(&self, id: BatchId) -> Result<bool, RepositoryError>;

    /// Number of batches with the given status.
    async fn count_by_status(&self, status: BatchStatus) -> Result<usize, RepositoryError>;

    /// Batches whose end time lies before `now`.
    async fn find_expired(&self, now: Timestamp) -> Result<Vec<Batch>, RepositoryError>;
}

// =============================================================================
// BLOCKCHAIN BRIDGE
// =============================================================================

/// Errors from the chain adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The node endpoint is unreachable.
    #[error("Blockchain connection failed: {0}")]
    Connection(String),

    /// The contract call reverted or could not be encoded.
    #[error("Contract interaction failed: {0}")]
    Contract(String),
}

/// Outcome of a mirrored contract transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: H256,
    /// Block the transaction landed in.
    pub block_number: u64,
    /// Gas consumed.
    pub gas_used: U256,
    /// Execution outcome.
    pub status: ReceiptStatus,
}

/// Execution outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// The transaction executed successfully.
    Success,
    /// The transaction reverted.
    Reverted,
}

/// Log coordinates shared by every contract event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLog {
    /// Block the log was emitted in.
    pub block_number: u64,
    /// Transaction that produced the log.
    pub transaction_hash: H256,
    /// Position of the log inside the block.
    pub log_index: u64,
}

/// Contract events surfaced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    /// A commitment landed on-chain.
    CommitmentSubmitted {
        log: ChainLog,
        batch_id: BatchId,
        user_address: Address,
        digest: CommitmentDigest,
    },
    /// A reveal landed on-chain.
    TransactionRevealed {
        log: ChainLog,
        batch_id: BatchId,
        user_address: Address,
        digest: CommitmentDigest,
    },
    /// A batch was finalized on-chain.
    BatchFinalized {
        log: ChainLog,
        batch_id: BatchId,
        ordering: Vec<CommitmentDigest>,
    },
}

impl ChainEvent {
    /// Stable name of this contract event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CommitmentSubmitted { .. } => "CommitmentSubmitted",
            Self::TransactionRevealed { .. } => "TransactionRevealed",
            Self::BatchFinalized { .. } => "BatchFinalized",
        }
    }

    /// Log coordinates of this event.
    pub fn log(&self) -> &ChainLog {
        match self {
            Self::CommitmentSubmitted { log, .. }
            | Self::TransactionRevealed { log, .. }
            | Self::BatchFinalized { log, .. } => log,
        }
    }
}

/// Per-batch state readable from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainBatch {
    /// Batch identifier.
    pub batch_id: BatchId,
    /// Commitments stored on-chain.
    pub commitment_count: u64,
    /// Reveals stored on-chain.
    pub reveal_count: u64,
    /// Whether the owner finalized the batch.
    pub finalized: bool,
}

/// Abstract interface over the on-chain protocol contract.
///
/// Write operations mirror coordinator effects and return the mined
/// receipt; queries read contract state; `subscribe` delivers contract
/// logs while listening is active.
#[async_trait]
pub trait BlockchainBridge: Send + Sync {
    /// Mirror a new batch on-chain.
    async fn create_new_batch(
        &self,
        batch_id: BatchId,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<TxReceipt, BridgeError>;

    /// Mirror an accepted commitment on-chain.
    async fn submit_commitment(
        &self,
        batch_id: BatchId,
        user_address: Address,
        digest: CommitmentDigest,
    ) -> Result<TxReceipt, BridgeError>;

    /// Mirror an accepted reveal on-chain.
    async fn reveal_transaction(
        &self,
        batch_id: BatchId,
        user_address: Address,
        transaction: &TransactionData,
        nonce: &str,
    ) -> Result<TxReceipt, BridgeError>;

    /// Mirror finalization on-chain.
    async fn finalize_batch(
        &self,
        batch_id: BatchId,
        ordering: &[CommitmentDigest],
    ) -> Result<TxReceipt, BridgeError>;

    /// Read per-batch contract state.
    async fn batch_data(&self, batch_id: BatchId) -> Result<Option<OnChainBatch>, BridgeError>;

    /// The batch the contract currently considers active.
    async fn current_active_batch_id(&self) -> Result<Option<BatchId>, BridgeError>;

    /// The digest the contract stores for `(batch, user)`.
    async fn commitment_digest(
        &self,
        batch_id: BatchId,
        user_address: Address,
    ) -> Result<Option<CommitmentDigest>, BridgeError>;

    /// Receiver for contract events. Events flow only between
    /// `start_event_listening` and `stop_event_listening`.
    fn subscribe(&self) -> broadcast::Receiver<ChainEvent>;

    /// Begin delivering contract events to subscribers.
    async fn start_event_listening(&self) -> Result<(), BridgeError>;

    /// Stop delivering contract events.
    async fn stop_event_listening(&self) -> Result<(), BridgeError>;
}
