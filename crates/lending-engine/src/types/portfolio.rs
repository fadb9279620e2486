use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::health::{HealthFactor, HealthTier};

/// Account-level figures derived from the current positions.
///
/// Never stored; recomputed on every query. Every figure is rounded to two
/// decimal places after full-precision computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(rename = "totalSuppliedUSD", with = "rust_decimal::serde::str")]
    pub total_supplied_usd: Decimal,
    #[serde(rename = "totalBorrowedUSD", with = "rust_decimal::serde::str")]
    pub total_borrowed_usd: Decimal,
    #[serde(rename = "netAPY", with = "rust_decimal::serde::str")]
    pub net_apy: Decimal,
    pub health_factor: HealthFactor,
    pub health_tier: HealthTier,
    /// Percent of weighted collateral not yet used by debt.
    #[serde(with = "rust_decimal::serde::str")]
    pub borrowing_power: Decimal,
    #[serde(rename = "maxBorrowUSD", with = "rust_decimal::serde::str")]
    pub max_borrow_usd: Decimal,
}
