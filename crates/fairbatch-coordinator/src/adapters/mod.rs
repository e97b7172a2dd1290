//! In-tree adapters: event dispatch, in-memory storage, mock bridge.

pub mod dispatcher;
pub mod memory_repository;
pub mod mock_bridge;

pub use dispatcher::{EventDispatcher, EventSubscriber, NoOpSubscriber, RecordingSubscriber};
pub use memory_repository::InMemoryBatchRepository;
pub use mock_bridge::{BridgeCall, MockBlockchainBridge};
