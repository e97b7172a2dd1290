//! Ports: the coordinator's inbound API and outbound dependencies.

pub mod inbound;
pub mod outbound;

pub use inbound::BatchCoordinatorApi;
pub use outbound::{
    BatchFilter, BatchRepository, BatchStatistics, BlockchainBridge, BridgeError, ChainEvent,
    ChainLog, Clock, FixedClock, OnChainBatch, Page, ReceiptStatus, RepositoryError, SystemClock,
    TxReceipt,
};
