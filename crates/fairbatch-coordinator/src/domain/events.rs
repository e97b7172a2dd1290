//! Domain events emitted by the batch aggregate.
//!
//! Events accumulate in the aggregate's buffer in emission order and are
//! drained by the orchestrator after a successful persist, then handed to
//! the dispatcher. Downstream consumers (persistence projections, the
//! chain bridge, API notifications) subscribe there.

use super::batch::BatchStatus;
use fairbatch_types::{Address, BatchId, CommitmentDigest, OrderingMethod, Timestamp, U256};
use serde::{Deserialize, Serialize};

/// Schema version stamped on every event.
pub const EVENT_VERSION: u16 = 1;

/// Envelope around a single aggregate event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// The batch that emitted the event.
    pub aggregate_id: BatchId,
    /// When the event occurred.
    pub occurred_on: Timestamp,
    /// Envelope schema version.
    pub event_version: u16,
    /// Typed payload.
    pub data: BatchEvent,
}

impl DomainEvent {
    /// Wrap a payload in a version-1 envelope.
    pub fn new(aggregate_id: BatchId, occurred_on: Timestamp, data: BatchEvent) -> Self {
        Self {
            aggregate_id,
            occurred_on,
            event_version: EVENT_VERSION,
            data,
        }
    }

    /// Stable event name for routing and storage.
    pub fn event_name(&self) -> &'static str {
        self.data.name()
    }
}

/// Typed payloads for every batch lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// A new batch opened its commitment phase.
    BatchCreated {
        start_time: Timestamp,
        end_time: Timestamp,
        ordering_method: OrderingMethod,
        commitment_phase_end: Timestamp,
        reveal_phase_end: Timestamp,
    },

    /// A user's commitment was recorded.
    CommitmentAdded {
        user_address: Address,
        digest: CommitmentDigest,
        commitment_count: u64,
    },

    /// A committed transaction was revealed and verified.
    TransactionRevealed {
        user_address: Address,
        digest: CommitmentDigest,
        revealed_count: u64,
    },

    /// The recorded status moved.
    BatchStatusChanged {
        from: BatchStatus,
        to: BatchStatus,
        changed_at: Timestamp,
    },

    /// The batch completed with a final ordering and MEV accounting.
    BatchFinalized {
        total_transactions: u64,
        mev_extracted: U256,
        savings_generated: U256,
        finalized_at: Timestamp,
    },
}

impl BatchEvent {
    /// Stable name of this event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchCreated { .. } => "BatchCreated",
            Self::CommitmentAdded { .. } => "CommitmentAdded",
            Self::TransactionRevealed { .. } => "TransactionRevealed",
            Self::BatchStatusChanged { .. } => "BatchStatusChanged",
            Self::BatchFinalized { .. } => "BatchFinalized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let event = BatchEvent::BatchStatusChanged {
            from: BatchStatus::CommitmentPhase,
            to: BatchStatus::RevealPhase,
            changed_at: 0,
        };
        assert_eq!(event.name(), "BatchStatusChanged");
    }

    #[test]
    fn test_envelope_defaults_to_version_one() {
        let event = DomainEvent::new(
            BatchId::new(),
            42,
            BatchEvent::CommitmentAdded {
                user_address: Address::zero(),
                digest: CommitmentDigest::zero(),
                commitment_count: 1,
            },
        );
        assert_eq!(event.event_version, EVENT_VERSION);
        assert_eq!(event.event_name(), "CommitmentAdded");
        assert_eq!(event.occurred_on, 42);
    }

    #[test]
    fn test_event_serializes() {
        let event = DomainEvent::new(
            BatchId::new(),
            7,
            BatchEvent::BatchFinalized {
                total_transactions: 3,
                mev_extracted: U256::zero(),
                savings_generated: U256::from(10u64),
                finalized_at: 7,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("BatchFinalized"));
    }
}
