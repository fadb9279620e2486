//! Position storage behind an injectable trait.
//!
//! The store holds each account's full position list under its
//! [`AccountKey`] and replaces the whole list on write. It is last-writer-wins
//! per key: callers that read-modify-write must serialize per key themselves
//! (the engine does so through [`super::account_locks::AccountLocks`]).

use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::EngineError;
use crate::types::{AccountKey, Position};

use super::market_registry::MarketRegistry;

/// Key-value storage for account position lists.
///
/// Implement this over a durable backend to replace the default in-memory
/// map; the risk calculator and simulator never touch the store.
pub trait PositionStore: Send + Sync {
    /// Stored positions for `key`, or `None` if the account was never written.
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<Position>>, EngineError>;

    /// Replace the full position list for `key`.
    fn set(&self, key: &AccountKey, positions: Vec<Position>) -> Result<(), EngineError>;
}

/// Volatile process-local store. State is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    accounts: RwLock<HashMap<AccountKey, Vec<Position>>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts written so far.
    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PositionStore for InMemoryPositionStore {
    fn get(&self, key: &AccountKey) -> Result<Option<Vec<Position>>, EngineError> {
        let accounts = self.accounts.read().map_err(|_| EngineError::Store {
            reason: "position map lock poisoned".into(),
        })?;
        Ok(accounts.get(key).cloned())
    }

    fn set(&self, key: &AccountKey, positions: Vec<Position>) -> Result<(), EngineError> {
        let mut accounts = self.accounts.write().map_err(|_| EngineError::Store {
            reason: "position map lock poisoned".into(),
        })?;
        accounts.insert(key.clone(), positions);
        Ok(())
    }
}

/// All-zero position for every listed market. APYs are the base listing
/// values on every network; only the market listing applies the network
/// multiplier.
pub fn materialize_positions(registry: &MarketRegistry) -> Vec<Position> {
    registry
        .base_markets()
        .iter()
        .map(Position::empty)
        .collect()
}

/// Stored positions for `key`, or a freshly materialized zero set. Never writes.
pub fn load_or_materialize(
    store: &dyn PositionStore,
    registry: &MarketRegistry,
    key: &AccountKey,
) -> Result<Vec<Position>, EngineError> {
    Ok(store
        .get(key)?
        .unwrap_or_else(|| materialize_positions(registry)))
}
