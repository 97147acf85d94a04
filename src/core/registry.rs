use crate::core::SubscriberId;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// In-memory set of broadcast recipients.
///
/// Subscribe and unsubscribe are idempotent. [`snapshot`](Self::snapshot) copies the set
/// under the read lock, so a broadcast iterates a stable view while commands keep mutating.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: RwLock<HashSet<SubscriberId>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not subscribed before.
    pub fn subscribe(&self, id: SubscriberId) -> bool {
        let added = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        if added {
            tracing::info!(subscriber = %id, "➕ Subscribed");
        } else {
            tracing::debug!(subscriber = %id, "Already subscribed");
        }
        added
    }

    /// Returns `true` if the id was subscribed. Removing an unknown id is a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed {
            tracing::info!(subscriber = %id, "➖ Unsubscribed");
        }
        removed
    }

    /// Sorted point-in-time copy of the subscribers.
    pub fn snapshot(&self) -> Vec<SubscriberId> {
        let set = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<SubscriberId> = set.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
