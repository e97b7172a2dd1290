//! Shared wiring for end-to-end scenarios.

use fairbatch_coordinator::adapters::{
    EventDispatcher, InMemoryBatchRepository, MockBlockchainBridge, RecordingSubscriber,
};
use fairbatch_coordinator::application::{
    CreateBatchRequest, MevMetricsRequest, SubmitCommitmentRequest,
};
use fairbatch_coordinator::ports::outbound::FixedClock;
use fairbatch_coordinator::{CoordinatorConfig, CoordinatorService, Metrics};
use fairbatch_types::{format_digest, Address, CommitmentDigest, OrderingMethod, Timestamp, TransactionData, U256};
use std::sync::Arc;

/// Frozen reference instant for every scenario.
pub const T0: Timestamp = 1_700_000_000;

/// One minute, in seconds.
pub const MIN: u64 = 60;

/// A fully wired coordinator over in-memory adapters.
pub struct Harness {
    pub service: CoordinatorService,
    pub repository: Arc<InMemoryBatchRepository>,
    pub bridge: Arc<MockBlockchainBridge>,
    pub clock: Arc<FixedClock>,
    pub recorder: Arc<RecordingSubscriber>,
    pub metrics: Arc<Metrics>,
}

impl Harness {
    /// Wire a coordinator with the clock frozen at [`T0`].
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryBatchRepository::new());
        let bridge = Arc::new(MockBlockchainBridge::new());
        let clock = Arc::new(FixedClock::new(T0));
        let dispatcher = Arc::new(EventDispatcher::new());
        let recorder = Arc::new(RecordingSubscriber::new());
        dispatcher.subscribe(recorder.clone());
        let metrics = Arc::new(Metrics::new());

        let service = CoordinatorService::new(
            repository.clone(),
            bridge.clone(),
            clock.clone(),
            dispatcher,
            metrics.clone(),
            CoordinatorConfig::default(),
        );

        Self {
            service,
            repository,
            bridge,
            clock,
            recorder,
            metrics,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// The user address every scenario commits from.
pub const USER_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// A second user for multi-party scenarios.
pub const USER_C: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

/// The literal transaction from the protocol scenarios:
/// `to = 0xBBBB…, value = 1000 wei, gas limit 21000, gas price 1 gwei, nonce 0`.
pub fn scenario_tx() -> TransactionData {
    TransactionData::new(
        Address::from_slice(&[0xBB; 20]),
        U256::from(1000u64),
        vec![],
        21_000,
        U256::from(1_000_000_000u64),
        0,
    )
    .unwrap()
}

/// A one-hour batch starting at `T0` with the default 30/15 windows.
pub fn hour_batch_request() -> CreateBatchRequest {
    CreateBatchRequest {
        start_time: T0,
        end_time: T0 + 60 * MIN,
        ordering_method: OrderingMethod::CommitReveal,
        commitment_duration_mins: None,
        reveal_duration_mins: None,
    }
}

/// Commitment submission for `user` over `digest`.
pub fn commitment_request(user: &str, digest: &CommitmentDigest) -> SubmitCommitmentRequest {
    SubmitCommitmentRequest {
        user_address: user.to_string(),
        commitment_hash: format_digest(digest),
        nonce: None,
    }
}

/// Wire metrics with the given counters and zero wei accumulators.
pub fn metrics_request(total: u64, successful: u64) -> MevMetricsRequest {
    MevMetricsRequest {
        extracted_value: "0".to_string(),
        savings_generated: "0".to_string(),
        total_transactions: total,
        successful_transactions: successful,
        average_gas_price: "0".to_string(),
        total_gas_used: "0".to_string(),
    }
}
