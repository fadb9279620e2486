//! Per-account mutual exclusion for read-modify-write updates.
//!
//! One mutex per [`AccountKey`], created on first use and dropped again when
//! the last holder releases it, so the table only holds accounts with a
//! write in flight. Writers on different accounts never contend; two writers
//! on the same account run one after the other so neither update is lost.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::errors::EngineError;
use crate::types::AccountKey;

#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<AccountKey, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// A poisoned lock fails closed with [`EngineError::Store`].
    pub fn with_lock<T>(
        &self,
        key: &AccountKey,
        f: impl FnOnce() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let handle = self.handle(key)?;
        let result = handle
            .lock()
            .map_err(|_| EngineError::Store {
                reason: format!("account lock poisoned: {key}"),
            })
            .and_then(|_guard| f());
        self.release(key, &handle);
        result
    }

    fn handle(&self, key: &AccountKey) -> Result<Arc<Mutex<()>>, EngineError> {
        let mut locks = self.locks.lock().map_err(|_| EngineError::Store {
            reason: "account lock table poisoned".into(),
        })?;
        Ok(locks.entry(key.clone()).or_default().clone())
    }

    /// Drop the entry for `key` once the table and `handle` are its only owners.
    fn release(&self, key: &AccountKey, handle: &Arc<Mutex<()>>) {
        let Ok(mut locks) = self.locks.lock() else {
            return;
        };
        let idle = locks
            .get(key)
            .is_some_and(|h| Arc::ptr_eq(h, handle) && Arc::strong_count(handle) == 2);
        if idle {
            locks.remove(key);
        }
    }

    /// Number of accounts with a lock currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
