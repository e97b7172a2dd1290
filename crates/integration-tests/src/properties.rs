//! Universal properties of the commit-reveal protocol.

use crate::harness::{
    commitment_request, hour_batch_request, metrics_request, scenario_tx, Harness, MIN, T0,
    USER_A, USER_C,
};
use fairbatch_coordinator::application::{
    AdvanceBatchPhaseRequest, FinalizeBatchRequest, PhaseTransition, RevealTransactionRequest,
};
use fairbatch_coordinator::domain::invariants;
use fairbatch_coordinator::{BatchCoordinatorApi, BatchRepository, BatchStatus};
use fairbatch_crypto::{commitment_digest, verify_commitment};
use fairbatch_types::units::{eth_to_wei, wei_to_eth};
use fairbatch_types::{format_address, format_digest, U256};
use std::collections::HashSet;

/// Binding verification is symmetric: what the hasher produced, the
/// verifier accepts; any perturbation of payload or nonce fails.
#[test]
fn property_commitment_binding() {
    let tx = scenario_tx();
    let digest = commitment_digest(&tx, "abcdef1234");

    assert!(verify_commitment(&digest, &tx, "abcdef1234"));

    // nonce perturbation
    assert!(!verify_commitment(&digest, &tx, "abcdef1235"));

    // payload perturbation across every field
    let mut t = tx.clone();
    t.value = U256::from(1001u64);
    assert!(!verify_commitment(&digest, &t, "abcdef1234"));

    let mut t = tx.clone();
    t.gas_limit = 21_001;
    assert!(!verify_commitment(&digest, &t, "abcdef1234"));

    let mut t = tx.clone();
    t.data = vec![0x00];
    assert!(!verify_commitment(&digest, &t, "abcdef1234"));

    let mut t = tx;
    t.nonce = 1;
    assert!(!verify_commitment(&digest, &t, "abcdef1234"));
}

/// Aggregate invariants hold after every step of a full lifecycle.
#[tokio::test]
async fn property_invariants_hold_after_every_operation() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();

    let check = |batch| assert!(invariants::all_hold(&batch));
    check(h.repository.get(created.batch_id).await.unwrap());

    h.clock.set(T0 + 1);
    let digest = commitment_digest(&scenario_tx(), "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest))
        .await
        .unwrap();
    check(h.repository.get(created.batch_id).await.unwrap());

    h.clock.set(T0 + 31 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToReveal,
        })
        .await
        .unwrap();
    check(h.repository.get(created.batch_id).await.unwrap());

    let tx = scenario_tx();
    h.service
        .reveal_transaction(RevealTransactionRequest {
            user_address: USER_A.to_string(),
            commitment_hash: format_digest(&digest),
            to: format_address(&tx.to),
            value: "1000".to_string(),
            data: vec![],
            gas_limit: 21_000,
            gas_price: "1000000000".to_string(),
            tx_nonce: 0,
            reveal_nonce: "abcdef1234".to_string(),
        })
        .await
        .unwrap();
    check(h.repository.get(created.batch_id).await.unwrap());

    h.clock.set(T0 + 46 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToExecution,
        })
        .await
        .unwrap();
    h.service
        .finalize_batch(FinalizeBatchRequest {
            batch_id: Some(created.batch_id),
            ordering: vec![format_digest(&digest)],
            metrics: metrics_request(1, 1),
        })
        .await
        .unwrap();
    check(h.repository.get(created.batch_id).await.unwrap());
}

/// A completed batch's final ordering is a permutation of its reveals.
#[tokio::test]
async fn property_final_ordering_is_permutation_of_reveals() {
    let h = Harness::new();
    let created = h.service.create_batch(hour_batch_request()).await.unwrap();
    h.clock.set(T0 + 1);

    let tx_a = scenario_tx();
    let digest_a = commitment_digest(&tx_a, "abcdef1234");
    h.service
        .submit_commitment(commitment_request(USER_A, &digest_a))
        .await
        .unwrap();

    let mut tx_c = scenario_tx();
    tx_c.nonce = 1;
    let digest_c = commitment_digest(&tx_c, "fedcba9876");
    h.service
        .submit_commitment(commitment_request(USER_C, &digest_c))
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

    for (user, tx, nonce, digest) in [
        (USER_A, tx_a, "abcdef1234", digest_a),
        (USER_C, tx_c, "fedcba9876", digest_c),
    ] {
        h.service
            .reveal_transaction(RevealTransactionRequest {
                user_address: user.to_string(),
                commitment_hash: format_digest(&digest),
                to: format_address(&tx.to),
                value: "1000".to_string(),
                data: vec![],
                gas_limit: 21_000,
                gas_price: "1000000000".to_string(),
                tx_nonce: tx.nonce,
                reveal_nonce: nonce.to_string(),
            })
            .await
            .unwrap();
    }

    h.clock.set(T0 + 46 * MIN);
    h.service
        .advance_batch_phase(AdvanceBatchPhaseRequest {
            batch_id: None,
            transition: PhaseTransition::ToExecution,
        })
        .await
        .unwrap();
    h.service
        .finalize_batch(FinalizeBatchRequest {
            batch_id: Some(created.batch_id),
            ordering: vec![format_digest(&digest_c), format_digest(&digest_a)],
            metrics: metrics_request(2, 2),
        })
        .await
        .unwrap();

    let stored = h.repository.get(created.batch_id).await.unwrap();
    assert_eq!(stored.status(), BatchStatus::Completed);

    let ordered: HashSet<_> = stored.final_ordering().iter().copied().collect();
    let revealed: HashSet<_> = stored.revealed_digests().into_iter().collect();
    assert_eq!(ordered, revealed);
    assert_eq!(stored.final_ordering().len(), stored.revealed_count());
}

/// Round-trip law for the wei/eth unit conversions.
#[test]
fn property_wei_eth_round_trip() {
    for raw in [0u64, 1, 7, 1_000, 123_456_789] {
        let eth = U256::from(raw);
        assert_eq!(wei_to_eth(eth_to_wei(eth).unwrap()), eth);
    }
}
