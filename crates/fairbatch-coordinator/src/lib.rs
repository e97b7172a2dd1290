//! # Fairbatch Batch Coordinator
//!
//! Off-chain coordinator for MEV-resistant transaction sequencing via a
//! two-phase commit–reveal batch auction. Users publish binding but
//! opaque commitments during the commitment window, reveal the payloads
//! during the reveal window, and a deterministic ordering over the
//! revealed set is finalized and mirrored on-chain.
//!
//! ## Architecture
//!
//! - **Domain**: the [`domain::Batch`] aggregate, its state machine,
//!   domain events and invariants
//! - **Ports**: inbound use-case API ([`ports::BatchCoordinatorApi`]) and
//!   outbound dependencies ([`ports::BatchRepository`],
//!   [`ports::BlockchainBridge`], [`ports::Clock`])
//! - **Application**: use-case orchestration behind the uniform result
//!   envelope
//! - **Adapters**: in-memory repository, mock bridge and the domain
//!   event dispatcher

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

pub use application::service::CoordinatorService;
pub use application::{ErrorCode, UseCaseError, UseCaseResult};
pub use config::{AppConfig, ConfigError, CoordinatorConfig};
pub use domain::{Batch, BatchEvent, BatchParams, BatchStatus, DomainError, DomainEvent};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{BatchCoordinatorApi, BatchRepository, BlockchainBridge, Clock};
