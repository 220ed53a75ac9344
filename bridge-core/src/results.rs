//! Correlation of result events with the calls that started them.
//!
//! Operations such as `readNfcTag` resolve with a [`CorrelationId`] and
//! deliver their real result later through a `…Result` event. The event can
//! arrive before the caller has even seen the id, so the tracker keeps two
//! sides:
//!
//! - waiters: callers that asked for the result of an id
//! - parked results: results that arrived before anyone asked
//!
//! Parked results are bounded; the oldest is evicted first. A caller that no
//! longer wants a result calls [`ResultTracker::forget`]. There is no
//! host-side cancellation.

use std::collections::{HashMap, VecDeque};
use webbridge_types::CorrelationId;

/// Default bound on parked results.
pub const DEFAULT_MAX_PARKED: usize = 64;

/// Outcome of [`ResultTracker::complete`].
#[derive(Debug, PartialEq, Eq)]
pub enum Completion<W, T> {
    /// A waiter was registered; hand it the value.
    Claimed(W, T),
    /// Nobody was waiting; the value was parked.
    Parked {
        /// Id whose parked result was dropped to make room, if any.
        evicted: Option<CorrelationId>,
    },
}

/// Waiters and early results keyed by correlation id.
#[derive(Debug)]
pub struct ResultTracker<W, T> {
    max_parked: usize,
    waiters: HashMap<CorrelationId, W>,
    parked: VecDeque<(CorrelationId, T)>,
}

impl<W, T> Default for ResultTracker<W, T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARKED)
    }
}

impl<W, T> ResultTracker<W, T> {
    /// Create a tracker that parks at most `max_parked` early results.
    pub fn new(max_parked: usize) -> Self {
        Self {
            max_parked,
            waiters: HashMap::new(),
            parked: VecDeque::new(),
        }
    }

    /// Take the parked result for `id`, if it already arrived.
    pub fn take_parked(&mut self, id: &CorrelationId) -> Option<T> {
        let pos = self.parked.iter().position(|(pid, _)| pid == id)?;
        self.parked.remove(pos).map(|(_, value)| value)
    }

    /// Register `waiter` for the result of `id`.
    ///
    /// Returns the previous waiter for the same id, if any.
    pub fn expect(&mut self, id: CorrelationId, waiter: W) -> Option<W> {
        self.waiters.insert(id, waiter)
    }

    /// Hand `value` to the waiter for `id` without parking it.
    ///
    /// Returns the value back if nobody is waiting.
    pub fn claim(&mut self, id: CorrelationId, value: T) -> Result<(W, T), T> {
        match self.waiters.remove(&id) {
            Some(waiter) => Ok((waiter, value)),
            None => Err(value),
        }
    }

    /// Record the result for `id`, parking it if nobody is waiting.
    pub fn complete(&mut self, id: CorrelationId, value: T) -> Completion<W, T> {
        if let Some(waiter) = self.waiters.remove(&id) {
            return Completion::Claimed(waiter, value);
        }

        if self.max_parked == 0 {
            return Completion::Parked { evicted: Some(id) };
        }

        let mut evicted = None;
        if self.parked.len() >= self.max_parked {
            evicted = self.parked.pop_front().map(|(old, _)| old);
        }
        self.parked.push_back((id, value));
        Completion::Parked { evicted }
    }

    /// Drop all interest in `id`: its waiter and any parked result.
    ///
    /// Returns true if anything was removed.
    pub fn forget(&mut self, id: &CorrelationId) -> bool {
        let waiter = self.waiters.remove(id).is_some();
        let parked = self.take_parked(id).is_some();
        waiter || parked
    }

    /// Number of registered waiters.
    pub fn waiting_count(&self) -> usize {
        self.waiters.len()
    }

    /// Number of parked results.
    pub fn parked_count(&self) -> usize {
        self.parked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tracker = ResultTracker<&'static str, u32>;

    #[test]
    fn result_goes_to_waiter() {
        let mut tracker = Tracker::default();
        let id = CorrelationId::new();
        tracker.expect(id, "waiter");

        assert_eq!(tracker.complete(id, 7), Completion::Claimed("waiter", 7));
        assert_eq!(tracker.waiting_count(), 0);
    }

    #[test]
    fn early_result_is_parked_then_taken() {
        let mut tracker = Tracker::default();
        let id = CorrelationId::new();

        assert_eq!(tracker.complete(id, 7), Completion::Parked { evicted: None });
        assert_eq!(tracker.parked_count(), 1);
        assert_eq!(tracker.take_parked(&id), Some(7));
        assert_eq!(tracker.take_parked(&id), None);
    }

    #[test]
    fn parked_results_are_bounded() {
        let mut tracker = Tracker::new(2);
        let first = CorrelationId::new();
        tracker.complete(first, 1);
        tracker.complete(CorrelationId::new(), 2);

        let third = tracker.complete(CorrelationId::new(), 3);

        assert_eq!(third, Completion::Parked { evicted: Some(first) });
        assert_eq!(tracker.parked_count(), 2);
        assert_eq!(tracker.take_parked(&first), None);
    }

    #[test]
    fn zero_capacity_parks_nothing() {
        let mut tracker = Tracker::new(0);
        let id = CorrelationId::new();
        assert_eq!(tracker.complete(id, 1), Completion::Parked { evicted: Some(id) });
        assert_eq!(tracker.parked_count(), 0);
    }

    #[test]
    fn claim_never_parks() {
        let mut tracker = Tracker::default();
        let id = CorrelationId::new();

        assert_eq!(tracker.claim(id, 7), Err(7));
        assert_eq!(tracker.parked_count(), 0);

        tracker.expect(id, "w");
        assert_eq!(tracker.claim(id, 8), Ok(("w", 8)));
        assert_eq!(tracker.waiting_count(), 0);
    }

    #[test]
    fn forget_drops_waiter_and_parked() {
        let mut tracker = Tracker::default();
        let waiting = CorrelationId::new();
        let parked = CorrelationId::new();
        tracker.expect(waiting, "w");
        tracker.complete(parked, 1);

        assert!(tracker.forget(&waiting));
        assert!(tracker.forget(&parked));
        assert!(!tracker.forget(&parked));
        assert_eq!(tracker.waiting_count(), 0);
        assert_eq!(tracker.parked_count(), 0);
    }

    #[test]
    fn forgotten_id_result_is_parked_not_claimed() {
        let mut tracker = Tracker::default();
        let id = CorrelationId::new();
        tracker.expect(id, "w");
        tracker.forget(&id);

        assert!(matches!(tracker.complete(id, 1), Completion::Parked { .. }));
    }

    #[test]
    fn expect_replaces_previous_waiter() {
        let mut tracker = Tracker::default();
        let id = CorrelationId::new();
        assert_eq!(tracker.expect(id, "a"), None);
        assert_eq!(tracker.expect(id, "b"), Some("a"));
        assert_eq!(tracker.complete(id, 1), Completion::Claimed("b", 1));
    }
}
