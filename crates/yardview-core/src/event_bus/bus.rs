//! Event Bus implementation.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::events::{EventCategory, SceneEvent};
use crate::types::DataCallback;

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &SceneEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = DataCallback<SceneEvent>;

/// Synchronous publish/subscribe hub
///
/// The application owns one bus and hands it to the scene controller and
/// to every panel that listens.
pub struct EventBus {
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Publish an event to every matching subscriber
    ///
    /// Handlers run on the publishing thread before this returns. Returns the
    /// number of handlers that received the event.
    pub fn publish(&self, event: SceneEvent) -> usize {
        tracing::trace!(category = %event.category(), "{}", event.description());

        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }
        delivered
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// Handlers must not subscribe or unsubscribe from inside the callback.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(SceneEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
