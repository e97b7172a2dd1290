//! # Commitment Hashing
//!
//! The cryptographic root of the commit–reveal binding guarantee.
//!
//! ## Functions
//!
//! - [`commitment_digest`] / [`verify_commitment`]: the canonical SHA-256
//!   binding shared by coordinator and clients
//! - [`keccak256`]: the primitive the on-chain contract binds with
//! - [`fast_hash`]: 32-bit rolling hash for development tooling only

pub mod commitment;
pub mod fast_hash;

pub use commitment::{commitment_digest, commitment_digest_of_bytes, keccak256, verify_commitment};
pub use fast_hash::fast_hash;
