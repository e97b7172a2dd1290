//! Domain event dispatch.
//!
//! The orchestrators drain each aggregate's event buffer after a
//! successful persist and hand the events here. Subscribers see events
//! from one aggregate in emission order; ordering across aggregates is
//! unspecified.

use crate::domain::events::DomainEvent;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::debug;

/// A consumer of batch domain events.
pub trait EventSubscriber: Send + Sync {
    /// Handle one event. Must not block the dispatching task for long.
    fn handle(&self, event: &DomainEvent);
}

/// Fans drained aggregate events out to registered subscribers.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for all future dispatches.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver events in order to every subscriber.
    pub fn dispatch(&self, events: &[DomainEvent]) {
        if events.is_empty() {
            return;
        }

        let subscribers = self.subscribers.read();
        for event in events {
            debug!(
                aggregate_id = %event.aggregate_id,
                event = event.event_name(),
                "Dispatching domain event"
            );
            for subscriber in subscribers.iter() {
                subscriber.handle(event);
            }
        }
    }
}

/// Subscriber that drops every event.
#[derive(Debug, Clone, Default)]
pub struct NoOpSubscriber;

impl EventSubscriber for NoOpSubscriber {
    fn handle(&self, _event: &DomainEvent) {}
}

/// Subscriber that records every event, for assertions in tests.
#[derive(Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn received(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    /// Names of everything received so far, in order.
    pub fn received_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event_name()).collect()
    }
}

impl EventSubscriber for RecordingSubscriber {
    fn handle(&self, event: &DomainEvent) {
        self.events.lock().push(event.clone());
    }
}
