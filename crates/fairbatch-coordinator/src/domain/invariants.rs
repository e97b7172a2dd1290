//! Structural invariants of the batch aggregate.
//!
//! Pure predicates over a batch snapshot. The aggregate upholds these by
//! construction; tests assert them after every operation sequence.

use super::batch::Batch;

/// Every reveal is backed by a commitment from the same user with the
/// same digest.
pub fn reveal_commitment_linkage(batch: &Batch) -> bool {
    batch.reveals().iter().all(|reveal| {
        batch
            .commitment_for(&reveal.user_address)
            .map(|c| c.digest == reveal.commitment_digest)
            .unwrap_or(false)
    })
}

/// There can never be more reveals than commitments.
pub fn reveals_bounded_by_commitments(batch: &Batch) -> bool {
    batch.revealed_count() <= batch.commitment_count()
}

/// Phase boundaries are ordered inside the batch window.
pub fn phase_windows_ordered(batch: &Batch) -> bool {
    batch.start_time() <= batch.commitment_phase_end()
        && batch.commitment_phase_end() <= batch.reveal_phase_end()
        && batch.reveal_phase_end() <= batch.end_time()
}

/// All invariants at once.
pub fn all_hold(batch: &Batch) -> bool {
    reveal_commitment_linkage(batch)
        && reveals_bounded_by_commitments(batch)
        && phase_windows_ordered(batch)
}
