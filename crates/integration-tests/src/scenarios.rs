//! Literal end-to-end protocol scenarios.
//!
//! Each scenario drives the full stack with the clock frozen at `T0` and
//! asserts statuses, event order and error codes against exact values.

use crate::harness::{
    commitment_request, hour_batch_request, metrics_request, scenario_tx, Harness, MIN, T0,
    USER_A, USER_C,
};
use fairbatch_coordinator::application::{
    AdvanceBatchPhaseRequest, FinalizeBatchRequest, PhaseTransition, RevealTransactionRequest,
};
use fairbatch_coordinator::{
    BatchCoordinatorApi, BatchRepository, BatchStatus, BlockchainBridge, ErrorCode,
};
use fairbatch_crypto::commitment_digest;
use fairbatch_types::{format_address, format_digest};

fn reveal_request(user: &str, nonce: &str) -> RevealTransactionRequest {
    let tx = scenario_tx();
    RevealTransactionRequest {
        user_address: user.to_string(),
        commitment_hash: format_digest(&commitment_digest(&tx, "abcdef1234")),
        to: format_address(&tx.to),
        value: "1000".to_string(),
        data: vec![],
        gas_limit: 21_000,
        gas_price: "1000000000".to_string(),
        tx_nonce: 0,
        reveal_nonce: nonce.to_string(),
    }
}

#[tokio::test]
async fn scenario_happy_path() {
    let h = Harness::new();

    // T0: a one-hour batch with 30/15 minute windows
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    assert_eq!(created.status, BatchStatus::CommitmentPhase);

    // T0+1s: user A commits to the transaction under nonce "abcdef1234"
    h.clock.set(T0 + 1);
    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    let submitted = h
        .service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap();
    assert_eq!(submitted.commitment_count, 1);

    // T0+31min: the phase is advanced and the user reveals the same payload
    h.clock.set(T0 + 31 * MIN);
    let advanced = h
        .service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToReveal,
        })
        .await
        .unwrap();
    assert_eq!(advanced.from, BatchStatus::CommitmentPhase);
    assert_eq!(advanced.to, BatchStatus::RevealPhase);

    let revealed = h
        .service
        .reveal_transaction(reveal_request(USER_A, "abcdef1234"))
        .await
        .unwrap();
    assert_eq!(revealed.revealed_count, 1);

    // T0+46min: execution phase, then finalize with the ordering [H]
    h.clock.set(T0 + 46 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToExecution,
        })
        .await
        .unwrap();

    let finalized = h
        .service
        .finalize_batch(FinalizeBatchRequest {
            batch_id: Some(created.batch_id),
            ordering: vec![format_digest(&digest)],
            metrics: metrics_request(1, 1),
        })
        .await
        .unwrap();
    assert_eq!(finalized.total_transactions, 1);

    // terminal state and the full event sequence, in order of occurrence
    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.status(), BatchStatus::Completed);
    assert_eq!(stored.final_ordering(), &[digest]);
    assert_eq!(
        h.recorder.received_names(),
        vec![
            "BatchCreated",
            "CommitmentAdded",
            "BatchStatusChanged",
            "TransactionRevealed",
            "BatchStatusChanged",
            "BatchFinalized",
        ]
    );
}

#[tokio::test]
async fn scenario_duplicate_commitment() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap();

    let err = h
        .service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::CommitmentAlreadyExists);
    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.commitment_count(), 1);
}

#[tokio::test]
async fn scenario_late_commitment() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();

    // T0+31min: one minute past the commitment deadline
    h.clock.set(T0 + 31 * MIN);
    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    let err = h
        .service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap_err();

    assert_eq!(err.message, "Batch is not in commitment phase");
    assert_eq!(err.code, ErrorCode::InvalidBatchStatus);

    // no event was emitted for the rejected attempt
    assert_eq!(h.recorder.received_names(), vec!["BatchCreated"]);
    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.commitment_count(), 0);
}

#[tokio::test]
async fn scenario_reveal_mismatch() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap();

    h.clock.set(T0 + 31 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToReveal,
        })
        .await
        .unwrap();

    // same transaction, wrong nonce
    let err = h
        .service
        .reveal_transaction(reveal_request(USER_A, "wrongwrongw"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::TransactionRevealMismatch);
    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.revealed_count(), 0);
}

#[tokio::test]
async fn scenario_illegal_state_transition() {
    let h = Harness::new();
    h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    let err = h
        .service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToExecution,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidBatchStatus);
    assert_eq!(
        err.message,
        "Invalid batch status: expected REVEAL_PHASE, got COMMITMENT_PHASE"
    );
}

#[tokio::test]
async fn scenario_reveal_rate_query() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    // two users commit
    let digest_a = commitment_digest(&scenario_tx(), "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest_a))
        .await
        .unwrap();

    let mut other_tx = scenario_tx();
    other_tx.nonce = 1;
    let digest_c = commitment_digest(&other_tx, "fedcba9876");
    h.service
        .submit_commitment(commitment_request(USER_C, &digest_c))
        .await
        .unwrap();

    // one reveals
    h.clock.set(T0 + 31 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToReveal,
        })
        .await
        .unwrap();
    h.service
        .reveal_transaction(reveal_request(USER_A, "abcdef1234"))
        .await
        .unwrap();

    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.commitment_count(), 2);
    assert_eq!(stored.revealed_count(), 1);
    assert_eq!(stored.reveal_rate(), 50.0);
}

#[tokio::test]
async fn scenario_bridge_mirrors_every_accepted_operation() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap();

    let on_chain = h.bridge.batch_data(created.batch_id).await.unwrap().unwrap();
    assert_eq!(on_chain.commitment_count, 1);
    assert!(!on_chain.finalized);

    let user = fairbatch_types::parse_address(USER_A).unwrap();
    assert_eq!(
        h.bridge
            .commitment_digest(created.batch_id, user)
            .await
            .unwrap(),
        Some(digest)
    );
}
