//! Fast non-cryptographic hash for development tooling.

/// 32-bit rolling hash over `payload || nonce`.
///
/// Collision-friendly and trivially forgeable. Useful for local fixtures
/// and property-test shrinking where SHA-256 cost matters; MUST NOT back
/// commitment verification against adversarial users.
pub fn fast_hash(payload: &[u8], nonce: &str) -> u32 {
    let mut state: u32 = 0;
    for &byte in payload.iter().chain(nonce.as_bytes()) {
        state = state
            .wrapping_shl(5)
            .wrapping_sub(state)
            .wrapping_add(byte as u32);
    }
    state
}
