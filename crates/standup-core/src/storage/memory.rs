//! In-memory key-value store.
//!
//! Used by tests and by hosts that do not need the log to outlive the
//! process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::KvStore;
use crate::error::StoreError;

/// Volatile [`KvStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<f64>>>,
    /// Configure writes to fail
    fail_writes: AtomicBool,
    /// Configure reads to fail
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Raw view of the stored list, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<Vec<f64>> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<f64>>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<f64>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::ReadFailed {
                key: key.to_string(),
                message: "reads disabled".into(),
            });
        }
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[f64]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                message: "writes disabled".into(),
            });
        }
        self.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
