use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

/// Per-item mutation serialization
///
/// Each item id maps to an async mutex. A mutation holds the guard from
/// reading the previous state until its result is applied to the store, so
/// two mutations of the same item queue instead of racing. Different items
/// never block each other.
#[derive(Debug, Default)]
pub struct MutationLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl MutationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, item_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Drop locks nobody holds or waits on
        locks.retain(|id, lock| id == item_id || Arc::strong_count(lock) > 1);
        locks.entry(item_id.to_string()).or_default().clone()
    }

    /// Waits until no other mutation of `item_id` is in flight
    pub async fn acquire(&self, item_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(item_id).lock_owned().await
    }

    /// Returns true if a mutation of `item_id` currently holds its lock
    pub fn in_flight(&self, item_id: &str) -> bool {
        let locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .get(item_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }
}
