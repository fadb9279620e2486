//! Amount parsing and request checks.
//!
//! The engine is lenient by default: malformed amounts become zero and
//! over-withdraws clamp, so an interactive caller always gets a valid preview
//! while the user is still typing. Strict mode turns each of those
//! normalizations into an [`EngineError`] for programmatic callers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::types::{Market, Position, TransactionType};

use super::market_registry::MarketRegistry;

/// How the engine treats malformed or out-of-range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Normalize and proceed.
    #[default]
    Lenient,
    /// Reject with a typed error.
    Strict,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(EngineError::Config(format!("unknown validation mode: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount parsing
// ---------------------------------------------------------------------------

/// Parse plain (`"1.5"`) or scientific (`"1e-3"`) decimal notation.
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse an amount, mapping empty, unparseable and negative input to zero.
pub fn parse_amount_lenient(raw: &str) -> Decimal {
    match parse_decimal(raw) {
        Some(amount) if amount > Decimal::ZERO => amount.normalize(),
        _ => Decimal::ZERO,
    }
}

/// Parse an amount that must be a positive decimal.
pub fn parse_amount_strict(raw: &str) -> Result<Decimal, EngineError> {
    let invalid = |reason: &str| EngineError::InvalidAmount {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.trim().is_empty() {
        return Err(invalid("amount is empty"));
    }
    let amount = parse_decimal(raw).ok_or_else(|| invalid("not a decimal number"))?;
    if amount <= Decimal::ZERO {
        return Err(invalid("amount must be greater than zero"));
    }
    Ok(amount.normalize())
}

// ---------------------------------------------------------------------------
// Strict checks
// ---------------------------------------------------------------------------

/// Reject network ids the registry does not list.
pub fn check_network(registry: &MarketRegistry, network_id: u64) -> Result<(), EngineError> {
    if registry.is_supported_network(network_id) {
        Ok(())
    } else {
        Err(EngineError::UnsupportedNetwork { network_id })
    }
}

/// Resolve a listed market or fail.
pub fn check_asset<'a>(
    registry: &'a MarketRegistry,
    symbol: &str,
) -> Result<&'a Market, EngineError> {
    registry.market(symbol).ok_or_else(|| EngineError::UnknownAsset {
        symbol: symbol.to_string(),
    })
}

/// Reject an amount whose USD value does not fit the decimal range.
pub fn check_amount_usd(raw: &str, amount: Decimal, price: Decimal) -> Result<Decimal, EngineError> {
    amount
        .checked_mul(price)
        .ok_or_else(|| EngineError::InvalidAmount {
            raw: raw.to_string(),
            reason: "amount value overflows".into(),
        })
}

/// Reject withdraws and repays larger than the held balance.
pub fn check_balance(
    positions: &[Position],
    tx_type: TransactionType,
    symbol: &str,
    amount: Decimal,
) -> Result<(), EngineError> {
    let position = positions.iter().find(|p| p.symbol == symbol);
    let available = match tx_type {
        TransactionType::Withdraw => position.map(|p| p.supplied_amount),
        TransactionType::Repay => position.map(|p| p.borrowed_amount),
        TransactionType::Supply | TransactionType::Borrow => return Ok(()),
    }
    .unwrap_or(Decimal::ZERO);

    if amount > available {
        return Err(EngineError::InsufficientBalance {
            asset: symbol.to_string(),
            requested: amount,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::Position;

    fn held(symbol: &str, supplied: Decimal, borrowed: Decimal) -> Position {
        let registry = MarketRegistry::reference();
        let mut pos = Position::empty(registry.market(symbol).unwrap());
        pos.supplied_amount = supplied;
        pos.borrowed_amount = borrowed;
        pos
    }

    #[test]
    fn test_lenient_parse_normalizes_to_zero() {
        assert_eq!(parse_amount_lenient(""), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("   "), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("abc"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("-5"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("1.50"), dec!(1.5));
        assert_eq!(parse_amount_lenient(" 2 "), dec!(2));
        assert_eq!(parse_amount_lenient("1e-3"), dec!(0.001));
    }

    #[test]
    fn test_trailing_garbage_is_not_a_number() {
        assert_eq!(parse_amount_lenient("1.5abc"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("2 ETH"), Decimal::ZERO);
        let err = parse_amount_strict("1.5abc").unwrap_err();
        assert!(err.to_string().contains("not a decimal"));
    }

    #[test]
    fn test_strict_parse_rejects() {
        let err = parse_amount_strict("").unwrap_err();
        assert!(err.to_string().contains("empty"));
        let err = parse_amount_strict("1.2.3").unwrap_err();
        assert!(err.to_string().contains("not a decimal"));
        let err = parse_amount_strict("0").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
        assert_eq!(parse_amount_strict("0.25").unwrap(), dec!(0.25));
    }

    #[test]
    fn test_validation_mode_parse() {
        assert_eq!("Strict".parse::<ValidationMode>().unwrap(), ValidationMode::Strict);
        assert_eq!("lenient".parse::<ValidationMode>().unwrap(), ValidationMode::Lenient);
        assert!("loose".parse::<ValidationMode>().is_err());
        assert_eq!(ValidationMode::default(), ValidationMode::Lenient);
    }

    #[test]
    fn test_check_asset_and_network() {
        let registry = MarketRegistry::reference();
        assert!(check_asset(&registry, "ETH").is_ok());
        let err = check_asset(&registry, "ZZZ").unwrap_err();
        assert_eq!(err.code(), "unknown_asset");
        assert!(check_network(&registry, 8453).is_ok());
        let err = check_network(&registry, 56).unwrap_err();
        assert_eq!(err.code(), "unsupported_network");
    }

    #[test]
    fn test_check_balance() {
        let positions = vec![held("ETH", dec!(1.0), dec!(0.5))];
        assert!(check_balance(&positions, TransactionType::Withdraw, "ETH", dec!(1.0)).is_ok());
        assert!(check_balance(&positions, TransactionType::Repay, "ETH", dec!(0.5)).is_ok());
        assert!(check_balance(&positions, TransactionType::Supply, "ETH", dec!(100)).is_ok());

        let err = check_balance(&positions, TransactionType::Withdraw, "ETH", dec!(5.0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientBalance { ref asset, requested, available }
                if asset == "ETH" && requested == dec!(5.0) && available == dec!(1.0)
        ));

        // No record held counts as a zero balance.
        assert!(check_balance(&positions, TransactionType::Repay, "DAI", dec!(1)).is_err());
    }

    #[test]
    fn test_check_amount_usd_overflow() {
        assert_eq!(check_amount_usd("2", dec!(2), dec!(2245.5)).unwrap(), dec!(4491.0));
        let err = check_amount_usd("huge", Decimal::MAX, dec!(43250)).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }
}
