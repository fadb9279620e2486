//! Portfolio aggregator: one account's totals, yield and risk figures.

use rust_decimal::Decimal;

use crate::types::{PortfolioSummary, Position};

use super::market_registry::MarketRegistry;
use super::risk::{round_display, RiskSnapshot};

/// Value-weighted average APYs of a position set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedApys {
    pub total_supplied_usd: Decimal,
    pub total_borrowed_usd: Decimal,
    pub avg_supply_apy: Decimal,
    pub avg_borrow_apy: Decimal,
}

impl WeightedApys {
    pub fn of(positions: &[Position]) -> Self {
        let mut total_supplied_usd = Decimal::ZERO;
        let mut total_borrowed_usd = Decimal::ZERO;
        let mut weighted_supply = Decimal::ZERO;
        let mut weighted_borrow = Decimal::ZERO;

        for pos in positions {
            total_supplied_usd = total_supplied_usd.saturating_add(pos.supplied_value_usd);
            total_borrowed_usd = total_borrowed_usd.saturating_add(pos.borrowed_value_usd);
            weighted_supply =
                weighted_supply.saturating_add(pos.supplied_value_usd.saturating_mul(pos.supply_apy));
            weighted_borrow =
                weighted_borrow.saturating_add(pos.borrowed_value_usd.saturating_mul(pos.borrow_apy));
        }

        let avg = |weighted: Decimal, total: Decimal| {
            if total > Decimal::ZERO {
                weighted / total
            } else {
                Decimal::ZERO
            }
        };

        Self {
            total_supplied_usd,
            total_borrowed_usd,
            avg_supply_apy: avg(weighted_supply, total_supplied_usd),
            avg_borrow_apy: avg(weighted_borrow, total_borrowed_usd),
        }
    }

    /// Yield on supplied value net of borrow cost, in percent.
    pub fn net_apy(&self) -> Decimal {
        if self.total_supplied_usd <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let earned = self.avg_supply_apy.saturating_mul(self.total_supplied_usd);
        let paid = self.avg_borrow_apy.saturating_mul(self.total_borrowed_usd);
        (earned - paid) / self.total_supplied_usd
    }
}

/// Summarize an account. Pure: identical input always yields identical output.
pub fn summarize(positions: &[Position], registry: &MarketRegistry) -> PortfolioSummary {
    let apys = WeightedApys::of(positions);
    let risk = RiskSnapshot::of(positions, registry);

    PortfolioSummary {
        total_supplied_usd: round_display(apys.total_supplied_usd),
        total_borrowed_usd: round_display(apys.total_borrowed_usd),
        net_apy: round_display(apys.net_apy()),
        health_factor: risk.health_factor.map(round_display),
        health_tier: risk.tier(),
        borrowing_power: round_display(risk.borrowing_power.power_percent),
        max_borrow_usd: round_display(risk.borrowing_power.max_borrow_usd),
    }
}
