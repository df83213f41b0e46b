//! Per-record serialization.
//!
//! Sweeps and notification handlers may touch the same record concurrently.
//! Every public entry point holds the record's lock for the whole
//! read-compare-write sequence, so two workers never interleave on one record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held for the duration of one record's reconciliation.
pub type RecordGuard = OwnedMutexGuard<()>;

/// Lock key of a booking customer.
pub fn booking_key(uri: &str) -> String {
    uri.to_string()
}

/// Lock key of a CRM contact.
pub fn crm_key(id: &str) -> String {
    format!("crm:{}", id)
}

/// Registry of per-record async mutexes.
///
/// Entries are weak so idle records cost nothing; stale entries are pruned as
/// the registry grows.
#[derive(Debug, Clone, Default)]
pub struct RecordLocks {
    inner: Arc<Mutex<HashMap<String, Weak<AsyncMutex<()>>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: &str) -> RecordGuard {
        let lock = self.lock_for(key);
        lock.lock_owned().await
    }

    fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = locks.get(key).and_then(Weak::upgrade) {
            return existing;
        }

        if locks.len() >= 64 && locks.len().is_power_of_two() {
            locks.retain(|_, lock| lock.strong_count() > 0);
        }

        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }

    /// Number of records currently locked or awaited.
    pub fn active(&self) -> usize {
        self.inner
            .lock()
            .map(|locks| locks.values().filter(|lock| lock.strong_count() > 0).count())
            .unwrap_or_default()
    }
}
