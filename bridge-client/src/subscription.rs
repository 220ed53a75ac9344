//! Event subscription handles.

use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use webbridge_core::{ListenerId, ListenerRegistry};

/// An event listener.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry<Handler>>>;

/// Capability to remove exactly one listener registration.
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    event: String,
    registry: Weak<Mutex<ListenerRegistry<Handler>>>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, event: &str, registry: &SharedRegistry) -> Self {
        Self {
            id,
            event: event.to_string(),
            registry: Arc::downgrade(registry),
        }
    }

    /// Registration id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Event name this subscription listens to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove the registration.
    ///
    /// Returns false if the client is gone or the listener was already
    /// removed.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.id);
        if removed {
            tracing::debug!(event = %self.event, id = self.id.value(), "listener removed");
        }
        removed
    }
}
