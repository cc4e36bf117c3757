//! Subscription Registry
//!
//! Process-wide table of active service subscriptions. Each entry owns the
//! callback currently installed at the registry client; the callback is
//! reachable only through this table, so removing the entry releases it
//! deterministically. Insertion is atomic on the key, which makes the
//! insert-then-subscribe pair race-safe: two concurrent subscribes for the
//! same service produce exactly one registry-level subscription.

pub mod pool;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::client::ChangeCallback;

pub use pool::CallbackPool;

/// Table of installed callbacks keyed by subscription key
#[derive(Default)]
pub struct SubscriptionTable {
    entries: DashMap<String, ChangeCallback>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert only when the key is vacant; the returned flag tells the
    /// caller whether to issue a registry-level subscribe
    pub fn insert_if_absent(&self, key: &str, callback: ChangeCallback) -> bool {
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(callback);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Remove and return the installed callback, if any
    pub fn remove(&self, key: &str) -> Option<ChangeCallback> {
        self.entries.remove(key).map(|(_, callback)| callback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
