//! Admission control for discovered addresses

use crate::url::Address;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The set of targets already admitted for dispatch in one crawl
///
/// `try_admit` is the only synchronization point that keeps two workers from
/// fetching the same target. Entries are never evicted.
#[derive(Debug, Default)]
pub struct Frontier {
    seen: Mutex<HashSet<String>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits an address if its target has not been seen before
    ///
    /// Returns true exactly once per target across all callers; the caller
    /// that gets `true` owns the obligation to fetch the address.
    pub fn try_admit(&self, address: &Address) -> bool {
        self.lock().insert(address.target().to_string())
    }

    pub fn contains(&self, target: &str) -> bool {
        self.lock().contains(target)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns every admitted target, sorted
    pub fn snapshot(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.lock().iter().cloned().collect();
        targets.sort();
        targets
    }

    // A panic while holding the lock cannot leave the set half-updated
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
