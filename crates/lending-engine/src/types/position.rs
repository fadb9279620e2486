use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

use super::market::Market;

/// One account's balances in one asset.
///
/// Invariants: both amounts are non-negative, and `is_collateral` is false
/// whenever `supplied_amount` is zero. USD values are marked at the price in
/// effect when the operation ran and are not re-marked afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub supplied_amount: Decimal,
    #[serde(rename = "suppliedValueUSD", with = "rust_decimal::serde::str")]
    pub supplied_value_usd: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub borrowed_amount: Decimal,
    #[serde(rename = "borrowedValueUSD", with = "rust_decimal::serde::str")]
    pub borrowed_value_usd: Decimal,
    pub is_collateral: bool,
    /// APY snapshot taken when the record was created.
    #[serde(rename = "supplyAPY", with = "rust_decimal::serde::str")]
    pub supply_apy: Decimal,
    #[serde(rename = "borrowAPY", with = "rust_decimal::serde::str")]
    pub borrow_apy: Decimal,
}

impl Position {
    /// All-zero record for `market`, snapshotting its APYs.
    pub fn empty(market: &Market) -> Self {
        Self {
            symbol: market.symbol.clone(),
            name: market.name.clone(),
            supplied_amount: Decimal::ZERO,
            supplied_value_usd: Decimal::ZERO,
            borrowed_amount: Decimal::ZERO,
            borrowed_value_usd: Decimal::ZERO,
            is_collateral: false,
            supply_apy: market.supply_apy,
            borrow_apy: market.borrow_apy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.supplied_amount.is_zero() && self.borrowed_amount.is_zero()
    }
}

/// Store key for one account on one network. The address is lowercased on
/// construction so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountKey {
    network_id: u64,
    address: String,
}

impl AccountKey {
    pub fn new(network_id: u64, address: &str) -> Self {
        Self {
            network_id,
            address: address.trim().to_lowercase(),
        }
    }

    pub fn network_id(&self) -> u64 {
        self.network_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.network_id, self.address)
    }
}

impl FromStr for AccountKey {
    type Err = EngineError;

    /// Parse the `"{network_id}:{address}"` form used as the storage key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (network, address) = s
            .split_once(':')
            .ok_or_else(|| EngineError::InvalidAccountKey(s.to_string()))?;
        let network_id = network
            .parse::<u64>()
            .map_err(|_| EngineError::InvalidAccountKey(s.to_string()))?;
        if address.trim().is_empty() {
            return Err(EngineError::InvalidAccountKey(s.to_string()));
        }
        Ok(Self::new(network_id, address))
    }
}
