//! Risk calculator: health factor, borrowing power and health tiers.
//!
//! Everything here is a pure function of a position set and the market
//! registry, so previews and summaries can call it against any hypothetical
//! state. Values keep full decimal precision; rounding for display happens
//! only at the output edge via [`round_display`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::constants::{DISPLAY_DECIMALS, HF_AT_RISK, HF_DANGER, HF_LIQUIDATION, HF_SAFE};
use crate::types::{BorrowingPower, HealthFactor, HealthTier, Position};

use super::market_registry::MarketRegistry;

// ---------------------------------------------------------------------------
// Pure helper functions
// ---------------------------------------------------------------------------

/// Round half away from zero to [`DISPLAY_DECIMALS`] places.
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of `supplied_value_usd * collateral_factor` over collateral-enabled
/// positions with a positive supplied value.
pub fn weighted_collateral_usd(positions: &[Position], registry: &MarketRegistry) -> Decimal {
    positions
        .iter()
        .filter(|p| p.is_collateral && p.supplied_value_usd > Decimal::ZERO)
        .map(|p| p.supplied_value_usd * registry.collateral_factor(&p.symbol))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum of borrowed USD values.
pub fn total_debt_usd(positions: &[Position]) -> Decimal {
    positions
        .iter()
        .map(|p| p.borrowed_value_usd)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// HF = weighted collateral / debt, or `NoDebt` when debt is zero.
pub fn compute_health_factor(weighted_collateral_usd: Decimal, debt_usd: Decimal) -> HealthFactor {
    if debt_usd <= Decimal::ZERO {
        return HealthFactor::NoDebt;
    }
    HealthFactor::Ratio(
        weighted_collateral_usd
            .checked_div(debt_usd)
            .unwrap_or(Decimal::MAX),
    )
}

/// Remaining borrow headroom in USD and as a share of weighted collateral.
pub fn compute_borrowing_power(weighted_collateral_usd: Decimal, debt_usd: Decimal) -> BorrowingPower {
    let max_borrow_usd = (weighted_collateral_usd - debt_usd).max(Decimal::ZERO);
    let power_percent = if weighted_collateral_usd > Decimal::ZERO {
        max_borrow_usd / weighted_collateral_usd * dec!(100)
    } else {
        Decimal::ZERO
    };
    BorrowingPower {
        max_borrow_usd,
        power_percent,
    }
}

/// Classify a health factor. No debt is always safe.
pub fn determine_tier(hf: HealthFactor) -> HealthTier {
    let Some(ratio) = hf.ratio() else {
        return HealthTier::Safe;
    };
    if ratio >= HF_SAFE {
        HealthTier::Safe
    } else if ratio >= HF_AT_RISK {
        HealthTier::Stable
    } else if ratio >= HF_DANGER {
        HealthTier::AtRisk
    } else if ratio >= HF_LIQUIDATION {
        HealthTier::Danger
    } else {
        HealthTier::Liquidatable
    }
}

// ---------------------------------------------------------------------------
// Position-set entry points
// ---------------------------------------------------------------------------

pub fn health_factor(positions: &[Position], registry: &MarketRegistry) -> HealthFactor {
    RiskSnapshot::of(positions, registry).health_factor
}

pub fn borrowing_power(positions: &[Position], registry: &MarketRegistry) -> BorrowingPower {
    RiskSnapshot::of(positions, registry).borrowing_power
}

/// All risk figures of one position set, computed in a single pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSnapshot {
    pub weighted_collateral_usd: Decimal,
    pub total_debt_usd: Decimal,
    pub health_factor: HealthFactor,
    pub borrowing_power: BorrowingPower,
}

impl RiskSnapshot {
    pub fn of(positions: &[Position], registry: &MarketRegistry) -> Self {
        let weighted_collateral_usd = weighted_collateral_usd(positions, registry);
        let total_debt_usd = total_debt_usd(positions);
        Self {
            weighted_collateral_usd,
            total_debt_usd,
            health_factor: compute_health_factor(weighted_collateral_usd, total_debt_usd),
            borrowing_power: compute_borrowing_power(weighted_collateral_usd, total_debt_usd),
        }
    }

    pub fn tier(&self) -> HealthTier {
        determine_tier(self.health_factor)
    }
}
