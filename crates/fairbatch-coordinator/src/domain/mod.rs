//! Domain layer: the batch aggregate, its events, errors and invariants.

pub mod batch;
pub mod errors;
pub mod events;
pub mod invariants;

pub use batch::{
    Batch, BatchParams, BatchStatus, DEFAULT_COMMITMENT_DURATION_MINS, DEFAULT_REVEAL_DURATION_MINS,
};
pub use errors::DomainError;
pub use events::{BatchEvent, DomainEvent, EVENT_VERSION};
