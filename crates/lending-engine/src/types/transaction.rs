use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

use super::health::HealthTier;
use super::position::Position;

/// Account action a user can preview or submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Supply,
    Withdraw,
    Borrow,
    Repay,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [Self::Supply, Self::Withdraw, Self::Borrow, Self::Repay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Withdraw => "withdraw",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
        }
    }

    /// Whether the user sends tokens to the protocol, which needs an
    /// allowance (approve tx or permit signature).
    pub fn pulls_tokens(&self) -> bool {
        matches!(self, Self::Supply | Self::Repay)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supply" => Ok(Self::Supply),
            "withdraw" => Ok(Self::Withdraw),
            "borrow" => Ok(Self::Borrow),
            "repay" => Ok(Self::Repay),
            _ => Err(EngineError::UnknownTransactionType(s.to_string())),
        }
    }
}

/// Allowance flow the signing layer should use. Has no effect on accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Gasless signed permit.
    Permit,
    /// Separate approve transaction.
    Approve,
    /// The protocol sends tokens; no allowance needed.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

/// Opaque gas estimate supplied by an external quoter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasQuote {
    pub estimated_gas: String,
    #[serde(rename = "gasUSD", with = "rust_decimal::serde::str")]
    pub gas_usd: Decimal,
}

/// Before/after risk figures for a hypothetical transaction.
///
/// Health factors here are always finite: the no-debt sentinel is replaced
/// by the configured cap so consumers can compare them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPreview {
    #[serde(with = "rust_decimal::serde::str")]
    pub current_health_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub new_health_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_borrowing_power: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub new_borrowing_power: Decimal,
    pub new_health_tier: HealthTier,
    /// Projected HF is positive but below 1.
    pub will_liquidate: bool,
    /// Projected HF is in `[1.0, 1.2)`.
    pub is_risky: bool,
    /// Projected record of the target asset, absent when the account has
    /// no record for it.
    pub projected_position: Option<Position>,
    #[serde(flatten)]
    pub gas: GasQuote,
}

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// `0x`-prefixed 256-bit hex identifier.
    pub hash: String,
    pub status: TxStatus,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub asset: String,
    /// The amount exactly as requested.
    pub amount: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub approval: ApprovalMode,
}
