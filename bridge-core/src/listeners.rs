//! Event listener registry.
//!
//! Listeners are kept per event name in registration order. Registration is
//! additive: a new listener never replaces an earlier one, even for the same
//! handler. Removal takes the [`ListenerId`] returned at registration and
//! removes exactly that registration.
//!
//! Dispatch iterates a [`snapshot`](ListenerRegistry::snapshot) rather than the
//! live list, so a handler may add or remove listeners while an event is being
//! delivered. Such changes take effect from the next delivery.

use std::collections::HashMap;
use std::fmt;

/// Handle for one registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Numeric value (monotonic per registry).
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Per-event-name listener lists.
#[derive(Debug)]
pub struct ListenerRegistry<H> {
    next_id: u64,
    by_name: HashMap<String, Vec<(ListenerId, H)>>,
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ListenerRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            by_name: HashMap::new(),
        }
    }

    /// Append `handler` to the listeners of `name`.
    pub fn add(&mut self, name: &str, handler: H) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove the registration `id`.
    ///
    /// Returns false if it was already removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (name, listeners) in self.by_name.iter_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                found = true;
                if listeners.is_empty() {
                    emptied = Some(name.clone());
                }
                break;
            }
        }
        if let Some(name) = emptied {
            self.by_name.remove(&name);
        }
        found
    }

    /// Number of listeners registered for `name`.
    pub fn count(&self, name: &str) -> usize {
        self.by_name.get(name).map_or(0, Vec::len)
    }
}

impl<H: Clone> ListenerRegistry<H> {
    /// Copy of the current listeners for `name`, in registration order.
    pub fn snapshot(&self, name: &str) -> Vec<H> {
        self.by_name
            .get(name)
            .map(|listeners| listeners.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}
