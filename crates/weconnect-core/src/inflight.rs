//! Suppression of overlapping triggers on the same interactive control.
//!
//! Each pending action is keyed by what it does and which target it acts
//! on, so a slow like on one post never blocks liking another.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Like and unlike share one toggle per post.
    Like,
    Comment,
    Follow,
    DeletePost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub action: Action,
    pub target: i64,
}

impl ActionKey {
    pub fn new(action: Action, target: i64) -> Self {
        Self { action, target }
    }
}

/// Set of actions currently awaiting a response.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    pending: Arc<Mutex<HashSet<ActionKey>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<ActionKey>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `key`, or `None` if an identical action is already pending.
    pub fn try_begin(&self, key: ActionKey) -> Option<InFlightTicket> {
        if !self.lock().insert(key) {
            debug!(?key, "Suppressed duplicate action");
            return None;
        }
        Some(InFlightTicket {
            owner: self.clone(),
            key,
        })
    }

    pub fn is_pending(&self, key: ActionKey) -> bool {
        self.lock().contains(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Releases its key when dropped, whether the action succeeded or not.
#[derive(Debug)]
pub struct InFlightTicket {
    owner: InFlight,
    key: ActionKey,
}

impl InFlightTicket {
    pub fn key(&self) -> ActionKey {
        self.key
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_suppressed_until_released() {
        let inflight = InFlight::new();
        let key = ActionKey::new(Action::Like, 5);

        let ticket = inflight.try_begin(key).expect("first claim");
        assert!(inflight.is_pending(key));
        assert!(inflight.try_begin(key).is_none());

        drop(ticket);
        assert!(!inflight.is_pending(key));
        assert!(inflight.try_begin(key).is_some());
    }

    #[test]
    fn test_distinct_targets_independent() {
        let inflight = InFlight::new();
        let _like5 = inflight.try_begin(ActionKey::new(Action::Like, 5)).expect("like 5");
        let _like6 = inflight.try_begin(ActionKey::new(Action::Like, 6)).expect("like 6");
        let _comment5 = inflight
            .try_begin(ActionKey::new(Action::Comment, 5))
            .expect("comment 5");
        assert_eq!(inflight.len(), 3);
    }

    #[test]
    fn test_clones_share_pending_set() {
        let inflight = InFlight::new();
        let other = inflight.clone();
        let _ticket = inflight.try_begin(ActionKey::new(Action::Follow, 2)).expect("claim");
        assert!(other.try_begin(ActionKey::new(Action::Follow, 2)).is_none());
    }
}
