//! SHA-256 commitment binding.
//!
//! `digest = SHA-256(canonical_bytes(tx) || nonce_utf8)`. Both sides of the
//! protocol, the client producing a commitment and the coordinator
//! verifying a reveal, compute exactly this function, which is what makes
//! verification symmetric.

use fairbatch_types::{CommitmentDigest, TransactionData};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Compute the commitment digest for a transaction payload and nonce.
pub fn commitment_digest(transaction: &TransactionData, nonce: &str) -> CommitmentDigest {
    commitment_digest_of_bytes(&transaction.canonical_bytes(), nonce)
}

/// Compute the commitment digest over pre-encoded payload bytes.
///
/// Exposed for clients that canonicalize once and hash many candidate
/// nonces.
pub fn commitment_digest_of_bytes(payload: &[u8], nonce: &str) -> CommitmentDigest {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.update(nonce.as_bytes());
    let bytes: [u8; 32] = hasher.finalize().into();
    CommitmentDigest::from(bytes)
}

/// Check a revealed `(transaction, nonce)` pair against a stored digest.
pub fn verify_commitment(
    expected: &CommitmentDigest,
    transaction: &TransactionData,
    nonce: &str,
) -> bool {
    commitment_digest(transaction, nonce) == *expected
}

/// Keccak-256, the binding primitive of the on-chain contract.
///
/// The off-chain protocol binds with SHA-256; this exists for adapters
/// that mirror the contract's `keccak256(transaction || nonce)` check.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}
