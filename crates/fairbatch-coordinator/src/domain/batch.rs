//! The batch aggregate and its phase state machine.
//!
//! A batch owns its commitments, reveals, final ordering, metrics and the
//! buffer of events it emitted. All mutation goes through the methods
//! below; each one checks its preconditions against the recorded status
//! AND the caller-supplied clock, stamps `updated_at` and appends events.
//!
//! Legal transitions:
//!
//! ```text
//!   COMMITMENT_PHASE --advance_to_reveal-->    REVEAL_PHASE
//!   REVEAL_PHASE     --advance_to_execution--> EXECUTION_PHASE
//!   EXECUTION_PHASE  --finalize-->             COMPLETED
//!   (any non-terminal) --cancel-->             CANCELLED
//! ```
//!
//! No backward transition exists.

use super::errors::DomainError;
use super::events::{BatchEvent, DomainEvent};
use fairbatch_crypto::verify_commitment;
use fairbatch_types::{
    Address, BatchId, Commitment, CommitmentDigest, MevMetrics, OrderingMethod,
    RevealedTransaction, Timestamp, TransactionData,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default commitment window, in minutes.
pub const DEFAULT_COMMITMENT_DURATION_MINS: u64 = 30;

/// Default reveal window, in minutes.
pub const DEFAULT_REVEAL_DURATION_MINS: u64 = 15;

/// Recorded lifecycle phase of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Accepting opaque commitments.
    CommitmentPhase,
    /// Accepting reveals of committed transactions.
    RevealPhase,
    /// Awaiting the externally supplied ordering.
    ExecutionPhase,
    /// Finalized normally.
    Completed,
    /// Terminated administratively.
    Cancelled,
}

impl BatchStatus {
    /// Stable wire name (`COMMITMENT_PHASE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommitmentPhase => "COMMITMENT_PHASE",
            Self::RevealPhase => "REVEAL_PHASE",
            Self::ExecutionPhase => "EXECUTION_PHASE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Completed and cancelled batches accept no further operations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation parameters for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchParams {
    /// When the auction round opens.
    pub start_time: Timestamp,
    /// When the auction round closes.
    pub end_time: Timestamp,
    /// Ordering strategy recorded on the batch.
    pub ordering_method: OrderingMethod,
    /// Length of the commitment window, in minutes.
    pub commitment_duration_mins: u64,
    /// Length of the reveal window, in minutes.
    pub reveal_duration_mins: u64,
}

impl BatchParams {
    /// Parameters with the default 30/15 minute windows.
    pub fn new(start_time: Timestamp, end_time: Timestamp, ordering_method: OrderingMethod) -> Self {
        Self {
            start_time,
            end_time,
            ordering_method,
            commitment_duration_mins: DEFAULT_COMMITMENT_DURATION_MINS,
            reveal_duration_mins: DEFAULT_REVEAL_DURATION_MINS,
        }
    }
}

/// The batch aggregate root.
///
/// Obtainable only through [`Batch::create`] or deserialization from the
/// repository; collection accessors hand out snapshots, never live
/// references into the maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    id: BatchId,
    start_time: Timestamp,
    end_time: Timestamp,
    ordering_method: OrderingMethod,
    commitment_phase_end: Timestamp,
    reveal_phase_end: Timestamp,
    status: BatchStatus,
    commitments: HashMap<Address, Commitment>,
    reveals: HashMap<CommitmentDigest, RevealedTransaction>,
    final_ordering: Vec<CommitmentDigest>,
    metrics: Option<MevMetrics>,
    created_at: Timestamp,
    updated_at: Timestamp,
    #[serde(skip, default)]
    events: Vec<DomainEvent>,
}

impl Batch {
    /// Open a new batch in `COMMITMENT_PHASE`.
    ///
    /// # Errors
    /// `InvalidBatchTiming` when `end_time ≤ start_time`, the start lies
    /// in the past, or the two windows do not fit inside the batch.
    pub fn create(params: BatchParams, now: Timestamp) -> Result<Self, DomainError> {
        if params.end_time <= params.start_time {
            return Err(DomainError::InvalidBatchTiming {
                reason: "end time must be after start time".to_string(),
            });
        }
        if params.start_time < now {
            return Err(DomainError::InvalidBatchTiming {
                reason: "start time must not be in the past".to_string(),
            });
        }

        let commitment_phase_end = params.start_time + params.commitment_duration_mins * 60;
        let reveal_phase_end = commitment_phase_end + params.reveal_duration_mins * 60;
        if reveal_phase_end > params.end_time {
            return Err(DomainError::InvalidBatchTiming {
                reason: "commitment and reveal windows exceed the batch duration".to_string(),
            });
        }

        let mut batch = Self {
            id: BatchId::new(),
            start_time: params.start_time,
            end_time: params.end_time,
            ordering_method: params.ordering_method,
            commitment_phase_end,
            reveal_phase_end,
            status: BatchStatus::CommitmentPhase,
            commitments: HashMap::new(),
            reveals: HashMap::new(),
            final_ordering: Vec::new(),
            metrics: None,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        };

        batch.emit(
            now,
            BatchEvent::BatchCreated {
                start_time: batch.start_time,
                end_time: batch.end_time,
                ordering_method: batch.ordering_method,
                commitment_phase_end: batch.commitment_phase_end,
                reveal_phase_end: batch.reveal_phase_end,
            },
        );

        Ok(batch)
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Record a user's commitment.
    ///
    /// # Errors
    /// - `CommitmentPhaseNotActive` when the recorded status is not
    ///   `COMMITMENT_PHASE` or the commitment deadline has passed
    /// - `CommitmentAlreadyExists` on a second commitment from the same user
    pub fn add_commitment(
        &mut self,
        commitment: Commitment,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if !self.is_in_commitment_phase(now) {
            return Err(DomainError::CommitmentPhaseNotActive);
        }
        if self.commitments.contains_key(&commitment.user_address) {
            return Err(DomainError::CommitmentAlreadyExists {
                user: commitment.user_address,
            });
        }

        let user_address = commitment.user_address;
        let digest = commitment.digest;
        self.commitments.insert(user_address, commitment);
        self.updated_at = now;
        self.emit(
            now,
            BatchEvent::CommitmentAdded {
                user_address,
                digest,
                commitment_count: self.commitments.len() as u64,
            },
        );

        Ok(())
    }

    /// Verify and record a reveal for a previously committed transaction.
    ///
    /// The failure ladder is checked in order:
    ///
    /// 1. `RevealPhaseNotActive`: status or deadline violated
    /// 2. `NoMatchingCommitment`: no commitment for the user, or its
    ///    digest differs from the one being revealed
    /// 3. `RevealMismatch`: `SHA-256(canonical(tx) || nonce)` disagrees
    ///    with the stored digest
    ///
    /// A failed reveal leaves the batch untouched.
    pub fn reveal_transaction(
        &mut self,
        digest: CommitmentDigest,
        transaction: TransactionData,
        user_address: Address,
        nonce: &str,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if !self.is_in_reveal_phase(now) {
            return Err(DomainError::RevealPhaseNotActive);
        }

        let matches_user = self
            .commitments
            .get(&user_address)
            .map(|c| c.digest == digest)
            .unwrap_or(false);
        if !matches_user {
            return Err(DomainError::NoMatchingCommitment { user: user_address });
        }

        if !verify_commitment(&digest, &transaction, nonce) {
            return Err(DomainError::RevealMismatch);
        }

        self.reveals.insert(
            digest,
            RevealedTransaction {
                commitment_digest: digest,
                transaction,
                user_address,
                revealed_at: now,
                nonce: nonce.to_string(),
            },
        );
        self.updated_at = now;
        self.emit(
            now,
            BatchEvent::TransactionRevealed {
                user_address,
                digest,
                revealed_count: self.reveals.len() as u64,
            },
        );

        Ok(())
    }

    /// Move `COMMITMENT_PHASE --> REVEAL_PHASE`.
    pub fn advance_to_reveal(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(BatchStatus::CommitmentPhase, BatchStatus::RevealPhase, now)
    }

    /// Move `REVEAL_PHASE --> EXECUTION_PHASE`.
    pub fn advance_to_execution(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(BatchStatus::RevealPhase, BatchStatus::ExecutionPhase, now)
    }

    /// Complete the batch with an externally supplied ordering.
    ///
    /// The ordering must be a strict permutation of the revealed digests:
    /// same length, all distinct, every element revealed.
    pub fn finalize(
        &mut self,
        ordering: Vec<CommitmentDigest>,
        metrics: MevMetrics,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if self.status != BatchStatus::ExecutionPhase {
            return Err(DomainError::InvalidStatus {
                expected: BatchStatus::ExecutionPhase,
                actual: self.status,
            });
        }

        if ordering.len() != self.reveals.len() {
            return Err(DomainError::InvalidOrdering {
                reason: format!(
                    "ordering has {} entries, {} transactions were revealed",
                    ordering.len(),
                    self.reveals.len()
                ),
            });
        }

        let mut seen = HashSet::with_capacity(ordering.len());
        for digest in &ordering {
            if !self.reveals.contains_key(digest) {
                return Err(DomainError::InvalidOrdering {
                    reason: format!("digest {digest:?} was never revealed"),
                });
            }
            if !seen.insert(*digest) {
                return Err(DomainError::InvalidOrdering {
                    reason: format!("digest {digest:?} appears twice"),
                });
            }
        }

        self.final_ordering = ordering;
        self.status = BatchStatus::Completed;
        self.updated_at = now;
        self.emit(
            now,
            BatchEvent::BatchFinalized {
                total_transactions: metrics.total_transactions,
                mev_extracted: metrics.extracted_value,
                savings_generated: metrics.savings_generated,
                finalized_at: now,
            },
        );
        self.metrics = Some(metrics);

        Ok(())
    }

    /// Terminate the batch administratively from any non-terminal state.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::TerminalStatus {
                actual: self.status,
            });
        }

        let from = self.status;
        self.status = BatchStatus::Cancelled;
        self.updated_at = now;
        self.emit(
            now,
            BatchEvent::BatchStatusChanged {
                from,
                to: BatchStatus::Cancelled,
                changed_at: now,
            },
        );

        Ok(())
    }

    fn transition(
        &mut self,
        expected: BatchStatus,
        to: BatchStatus,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::InvalidStatus {
                expected,
                actual: self.status,
            });
        }

        let from = self.status;
        self.status = to;
        self.updated_at = now;
        self.emit(
            now,
            BatchEvent::BatchStatusChanged {
                from,
                to,
                changed_at: now,
            },
        );

        Ok(())
    }

    fn emit(&mut self, now: Timestamp, data: BatchEvent) {
        self.events.push(DomainEvent::new(self.id, now, data));
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn ordering_method(&self) -> OrderingMethod {
        self.ordering_method
    }

    pub fn commitment_phase_end(&self) -> Timestamp {
        self.commitment_phase_end
    }

    pub fn reveal_phase_end(&self) -> Timestamp {
        self.reveal_phase_end
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Number of recorded commitments.
    pub fn commitment_count(&self) -> usize {
        self.commitments.len()
    }

    /// Number of verified reveals.
    pub fn revealed_count(&self) -> usize {
        self.reveals.len()
    }

    /// Percentage of commitments that were revealed, 0.0 when none exist.
    pub fn reveal_rate(&self) -> f64 {
        if self.commitments.is_empty() {
            return 0.0;
        }
        self.reveals.len() as f64 / self.commitments.len() as f64 * 100.0
    }

    /// True while new commitments are acceptable: recorded status is
    /// `COMMITMENT_PHASE` and the deadline has not passed.
    pub fn is_in_commitment_phase(&self, now: Timestamp) -> bool {
        self.status == BatchStatus::CommitmentPhase && now < self.commitment_phase_end
    }

    /// True while reveals are acceptable: recorded status is
    /// `REVEAL_PHASE` and the deadline has not passed.
    pub fn is_in_reveal_phase(&self, now: Timestamp) -> bool {
        self.status == BatchStatus::RevealPhase && now < self.reveal_phase_end
    }

    /// True once the wall clock has passed the batch's end.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.end_time
    }

    /// Snapshot of the commitment for one user.
    pub fn commitment_for(&self, user: &Address) -> Option<Commitment> {
        self.commitments.get(user).cloned()
    }

    /// Snapshot of all commitments.
    pub fn commitments(&self) -> Vec<Commitment> {
        self.commitments.values().cloned().collect()
    }

    /// Snapshot of one reveal by digest.
    pub fn reveal_for(&self, digest: &CommitmentDigest) -> Option<RevealedTransaction> {
        self.reveals.get(digest).cloned()
    }

    /// Snapshot of all reveals.
    pub fn reveals(&self) -> Vec<RevealedTransaction> {
        self.reveals.values().cloned().collect()
    }

    /// Digests of all revealed transactions.
    pub fn revealed_digests(&self) -> Vec<CommitmentDigest> {
        self.reveals.keys().copied().collect()
    }

    /// The final ordering; empty until finalization.
    pub fn final_ordering(&self) -> &[CommitmentDigest] {
        &self.final_ordering
    }

    /// MEV accounting; present only once finalized.
    pub fn metrics(&self) -> Option<&MevMetrics> {
        self.metrics.as_ref()
    }

    /// Events emitted since the last drain, in emission order.
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drain the event buffer for dispatch.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairbatch_crypto::commitment_digest;
    use fairbatch_types::U256;

    const T0: Timestamp = 1_700_000_000;
    const MIN: u64 = 60;

    fn params() -> BatchParams {
        BatchParams::new(T0, T0 + 60 * MIN, OrderingMethod::CommitReveal)
    }

    fn user(val: u64) -> Address {
        Address::from_low_u64_be(val)
    }

    fn sample_tx() -> TransactionData {
        TransactionData::new(
            user(0xBBBB),
            U256::from(1000u64),
            vec![],
            21_000,
            U256::from(1_000_000_000u64),
            0,
        )
        .unwrap()
    }

    fn committed_batch(nonce: &str) -> (Batch, CommitmentDigest) {
        let mut batch = Batch::create(params(), T0).unwrap();
        let tx = sample_tx();
        let digest = commitment_digest(&tx, nonce);
        let commitment =
            Commitment::new(digest, user(0xAAAA), T0 + 1, Some(nonce.to_string()), T0 + 1).unwrap();
        batch.add_commitment(commitment, T0 + 1).unwrap();
        (batch, digest)
    }

    #[test]
    fn test_create_sets_phase_boundaries() {
        let batch = Batch::create(params(), T0).unwrap();

        assert_eq!(batch.status(), BatchStatus::CommitmentPhase);
        assert_eq!(batch.commitment_phase_end(), T0 + 30 * MIN);
        assert_eq!(batch.reveal_phase_end(), T0 + 45 * MIN);
        assert_eq!(batch.pending_events().len(), 1);
        assert_eq!(batch.pending_events()[0].event_name(), "BatchCreated");
    }

    #[test]
    fn test_create_rejects_end_before_start() {
        let result = Batch::create(
            BatchParams::new(T0, T0, OrderingMethod::CommitReveal),
            T0,
        );
        assert!(matches!(
            result,
            Err(DomainError::InvalidBatchTiming { .. })
        ));
    }

    #[test]
    fn test_create_rejects_past_start() {
        let result = Batch::create(params(), T0 + 1);
        assert!(matches!(
            result,
            Err(DomainError::InvalidBatchTiming { .. })
        ));
    }

    #[test]
    fn test_create_rejects_windows_exceeding_duration() {
        // 30 + 15 minutes of phases inside a 40 minute batch
        let result = Batch::create(
            BatchParams::new(T0, T0 + 40 * MIN, OrderingMethod::CommitReveal),
            T0,
        );
        assert!(matches!(
            result,
            Err(DomainError::InvalidBatchTiming { .. })
        ));
    }

    #[test]
    fn test_add_commitment_records_and_emits() {
        let (batch, digest) = committed_batch("abcdef1234");

        assert_eq!(batch.commitment_count(), 1);
        assert_eq!(batch.commitment_for(&user(0xAAAA)).unwrap().digest, digest);
        assert_eq!(batch.pending_events()[1].event_name(), "CommitmentAdded");
        assert_eq!(batch.updated_at(), T0 + 1);
    }

    #[test]
    fn test_duplicate_commitment_rejected() {
        let (mut batch, digest) = committed_batch("abcdef1234");

        let again = Commitment::new(digest, user(0xAAAA), T0 + 2, None, T0 + 2).unwrap();
        let result = batch.add_commitment(again, T0 + 2);

        assert_eq!(
            result,
            Err(DomainError::CommitmentAlreadyExists { user: user(0xAAAA) })
        );
        assert_eq!(batch.commitment_count(), 1);
        // no event for the rejected attempt
        assert_eq!(batch.pending_events().len(), 2);
    }

    #[test]
    fn test_commitment_after_deadline_rejected() {
        let mut batch = Batch::create(params(), T0).unwrap();
        let commitment = Commitment::new(
            CommitmentDigest::from_low_u64_be(1),
            user(1),
            T0 + 31 * MIN,
            None,
            T0 + 31 * MIN,
        )
        .unwrap();

        let result = batch.add_commitment(commitment, T0 + 31 * MIN);

        assert_eq!(result, Err(DomainError::CommitmentPhaseNotActive));
        assert_eq!(result.unwrap_err().to_string(), "Batch is not in commitment phase");
        assert_eq!(batch.commitment_count(), 0);
    }

    #[test]
    fn test_commitment_in_wrong_status_rejected() {
        let mut batch = Batch::create(params(), T0).unwrap();
        batch.advance_to_reveal(T0 + 30 * MIN).unwrap();

        let commitment =
            Commitment::new(CommitmentDigest::from_low_u64_be(1), user(1), T0 + 1, None, T0 + 1)
                .unwrap();
        let result = batch.add_commitment(commitment, T0 + 31 * MIN);

        assert_eq!(result, Err(DomainError::CommitmentPhaseNotActive));
    }

    #[test]
    fn test_reveal_happy_path() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();

        batch
            .reveal_transaction(digest, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 32 * MIN)
            .unwrap();

        assert_eq!(batch.revealed_count(), 1);
        let reveal = batch.reveal_for(&digest).unwrap();
        assert_eq!(reveal.user_address, user(0xAAAA));
        assert_eq!(reveal.nonce, "abcdef1234");
        assert_eq!(reveal.revealed_at, T0 + 32 * MIN);
    }

    #[test]
    fn test_reveal_outside_phase_rejected() {
        let (mut batch, digest) = committed_batch("abcdef1234");

        // still in commitment phase
        let result =
            batch.reveal_transaction(digest, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 2);
        assert_eq!(result, Err(DomainError::RevealPhaseNotActive));
    }

    #[test]
    fn test_reveal_after_deadline_rejected() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();

        let result = batch.reveal_transaction(
            digest,
            sample_tx(),
            user(0xAAAA),
            "abcdef1234",
            T0 + 46 * MIN,
        );
        assert_eq!(result, Err(DomainError::RevealPhaseNotActive));
    }

    #[test]
    fn test_reveal_unknown_user_rejected() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();

        let result = batch.reveal_transaction(
            digest,
            sample_tx(),
            user(0xCCCC),
            "abcdef1234",
            T0 + 32 * MIN,
        );
        assert_eq!(
            result,
            Err(DomainError::NoMatchingCommitment { user: user(0xCCCC) })
        );
    }

    #[test]
    fn test_reveal_digest_mismatch_rejected() {
        let (mut batch, _) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();

        let other_digest = CommitmentDigest::from_low_u64_be(99);
        let result = batch.reveal_transaction(
            other_digest,
            sample_tx(),
            user(0xAAAA),
            "abcdef1234",
            T0 + 32 * MIN,
        );
        assert_eq!(
            result,
            Err(DomainError::NoMatchingCommitment { user: user(0xAAAA) })
        );
    }

    #[test]
    fn test_reveal_wrong_nonce_rejected_without_mutation() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();
        let events_before = batch.pending_events().len();

        let result = batch.reveal_transaction(
            digest,
            sample_tx(),
            user(0xAAAA),
            "wrongwrongw",
            T0 + 32 * MIN,
        );

        assert_eq!(result, Err(DomainError::RevealMismatch));
        assert_eq!(batch.revealed_count(), 0);
        assert_eq!(batch.pending_events().len(), events_before);
    }

    #[test]
    fn test_advance_guards() {
        let mut batch = Batch::create(params(), T0).unwrap();

        let result = batch.advance_to_execution(T0 + 1);
        assert_eq!(
            result,
            Err(DomainError::InvalidStatus {
                expected: BatchStatus::RevealPhase,
                actual: BatchStatus::CommitmentPhase,
            })
        );

        batch.advance_to_reveal(T0 + 30 * MIN).unwrap();
        let result = batch.advance_to_reveal(T0 + 31 * MIN);
        assert_eq!(
            result,
            Err(DomainError::InvalidStatus {
                expected: BatchStatus::CommitmentPhase,
                actual: BatchStatus::RevealPhase,
            })
        );
    }

    #[test]
    fn test_finalize_permutation_checks() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();
        batch
            .reveal_transaction(digest, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 32 * MIN)
            .unwrap();
        batch.advance_to_execution(T0 + 45 * MIN).unwrap();

        // wrong length
        let result = batch.finalize(vec![], MevMetrics::default(), T0 + 46 * MIN);
        assert!(matches!(result, Err(DomainError::InvalidOrdering { .. })));

        // unknown digest
        let result = batch.finalize(
            vec![CommitmentDigest::from_low_u64_be(7)],
            MevMetrics::default(),
            T0 + 46 * MIN,
        );
        assert!(matches!(result, Err(DomainError::InvalidOrdering { .. })));

        // strict permutation accepted
        batch
            .finalize(vec![digest], MevMetrics::default(), T0 + 46 * MIN)
            .unwrap();
        assert_eq!(batch.status(), BatchStatus::Completed);
        assert_eq!(batch.final_ordering(), &[digest]);
        assert!(batch.metrics().is_some());
    }

    #[test]
    fn test_finalize_rejects_duplicates() {
        let (mut batch, d1) = committed_batch("abcdef1234");

        // second user commits and reveals a different transaction
        let mut tx2 = sample_tx();
        tx2.nonce = 1;
        let d2 = commitment_digest(&tx2, "fedcba9876");
        let c2 = Commitment::new(d2, user(0xCCCC), T0 + 2, None, T0 + 2).unwrap();
        batch.add_commitment(c2, T0 + 2).unwrap();

        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();
        batch
            .reveal_transaction(d1, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 32 * MIN)
            .unwrap();
        batch
            .reveal_transaction(d2, tx2, user(0xCCCC), "fedcba9876", T0 + 33 * MIN)
            .unwrap();
        batch.advance_to_execution(T0 + 45 * MIN).unwrap();

        let result = batch.finalize(vec![d1, d1], MevMetrics::default(), T0 + 46 * MIN);
        assert!(matches!(result, Err(DomainError::InvalidOrdering { .. })));
    }

    #[test]
    fn test_finalize_requires_execution_phase() {
        let (mut batch, digest) = committed_batch("abcdef1234");

        let result = batch.finalize(vec![digest], MevMetrics::default(), T0 + 1);
        assert_eq!(
            result,
            Err(DomainError::InvalidStatus {
                expected: BatchStatus::ExecutionPhase,
                actual: BatchStatus::CommitmentPhase,
            })
        );
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        let mut batch = Batch::create(params(), T0).unwrap();
        batch.cancel(T0 + 1).unwrap();
        assert_eq!(batch.status(), BatchStatus::Cancelled);

        let result = batch.cancel(T0 + 2);
        assert_eq!(
            result,
            Err(DomainError::TerminalStatus {
                actual: BatchStatus::Cancelled,
            })
        );
    }

    #[test]
    fn test_reveal_rate() {
        let (mut batch, d1) = committed_batch("abcdef1234");

        let mut tx2 = sample_tx();
        tx2.nonce = 1;
        let d2 = commitment_digest(&tx2, "fedcba9876");
        let c2 = Commitment::new(d2, user(0xCCCC), T0 + 2, None, T0 + 2).unwrap();
        batch.add_commitment(c2, T0 + 2).unwrap();

        assert_eq!(batch.reveal_rate(), 0.0);

        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();
        batch
            .reveal_transaction(d1, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 32 * MIN)
            .unwrap();

        assert_eq!(batch.reveal_rate(), 50.0);
    }

    #[test]
    fn test_reveal_rate_zero_without_commitments() {
        let batch = Batch::create(params(), T0).unwrap();
        assert_eq!(batch.reveal_rate(), 0.0);
    }

    #[test]
    fn test_phase_predicates_combine_status_and_clock() {
        let batch = Batch::create(params(), T0).unwrap();

        assert!(batch.is_in_commitment_phase(T0 + 1));
        // recorded status unchanged, deadline passed
        assert!(!batch.is_in_commitment_phase(T0 + 30 * MIN));
        assert!(!batch.is_in_reveal_phase(T0 + 1));
        assert!(!batch.is_expired(T0 + 59 * MIN));
        assert!(batch.is_expired(T0 + 61 * MIN));
    }

    #[test]
    fn test_full_lifecycle_event_order() {
        let (mut batch, digest) = committed_batch("abcdef1234");
        batch.advance_to_reveal(T0 + 31 * MIN).unwrap();
        batch
            .reveal_transaction(digest, sample_tx(), user(0xAAAA), "abcdef1234", T0 + 32 * MIN)
            .unwrap();
        batch.advance_to_execution(T0 + 45 * MIN).unwrap();
        let metrics = MevMetrics::new(
            U256::zero(),
            U256::zero(),
            1,
            1,
            U256::zero(),
            U256::zero(),
        )
        .unwrap();
        batch.finalize(vec![digest], metrics, T0 + 46 * MIN).unwrap();

        let names: Vec<_> = batch
            .pending_events()
            .iter()
            .map(|e| e.event_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "BatchCreated",
                "CommitmentAdded",
                "BatchStatusChanged",
                "TransactionRevealed",
                "BatchStatusChanged",
                "BatchFinalized",
            ]
        );

        let mut drained = batch.take_events();
        assert_eq!(drained.len(), 6);
        assert!(batch.pending_events().is_empty());
        assert_eq!(drained.remove(0).aggregate_id, batch.id());
    }
}
