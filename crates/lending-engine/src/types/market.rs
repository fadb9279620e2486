use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A listed token. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Whether the token accepts a signed permit in place of an approve tx.
    pub supports_permit: bool,
}

/// A chain the engine keeps separate account state for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub symbol: String,
}

/// Per-asset reference data for one network.
///
/// Only the APYs vary by network; every other field is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub symbol: String,
    pub name: String,
    /// Percent, e.g. `2.45` for 2.45%.
    #[serde(rename = "supplyAPY", with = "rust_decimal::serde::str")]
    pub supply_apy: Decimal,
    #[serde(rename = "borrowAPY", with = "rust_decimal::serde::str")]
    pub borrow_apy: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_supply: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_borrow: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub available_liquidity: Decimal,
    /// Percent of supply currently borrowed.
    #[serde(with = "rust_decimal::serde::str")]
    pub utilization_rate: Decimal,
    /// Share of supplied value counted toward borrowing power, in `[0, 1]`.
    #[serde(with = "rust_decimal::serde::str")]
    pub collateral_factor: Decimal,
    /// Informational only; never enforced on execute.
    #[serde(with = "rust_decimal::serde::str")]
    pub liquidation_threshold: Decimal,
    #[serde(rename = "priceUSD", with = "rust_decimal::serde::str")]
    pub price_usd: Decimal,
}
