//! Transaction simulator: projects a single-asset transaction onto a copy of
//! an account and reports the before/after risk figures.
//!
//! The effect rule lives here and is the only code path that changes
//! balances. The executor calls [`apply_to_account`] on the stored set with
//! the same [`TransactionEffect`] a preview would use, so a preview and the
//! execute that follows it land on identical numbers.

use rust_decimal::Decimal;
use tracing::debug;

use crate::constants::{HF_DANGER, HF_LIQUIDATION};
use crate::types::{GasQuote, Position, TransactionPreview, TransactionType};

use super::market_registry::MarketRegistry;
use super::risk::{determine_tier, round_display, RiskSnapshot};

// ═══════════════════════════════════════════════════════════════════════════
// Effect rule
// ═══════════════════════════════════════════════════════════════════════════

/// A parsed transaction marked at the asset's registry price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionEffect {
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub amount_usd: Decimal,
}

impl TransactionEffect {
    /// Mark `amount` at `price`. A USD value outside the decimal range turns
    /// the effect into a no-op.
    pub fn new(tx_type: TransactionType, amount: Decimal, price: Decimal) -> Self {
        match amount.checked_mul(price) {
            Some(amount_usd) => Self {
                tx_type,
                amount,
                amount_usd,
            },
            None => {
                debug!(%tx_type, %amount, %price, "amount value overflows, treating as zero");
                Self {
                    tx_type,
                    amount: Decimal::ZERO,
                    amount_usd: Decimal::ZERO,
                }
            }
        }
    }
}

fn floor_sub(value: Decimal, delta: Decimal) -> Decimal {
    value.saturating_sub(delta).max(Decimal::ZERO)
}

/// Apply the effect to one position record.
///
/// Withdraw and repay floor at zero. A record left with nothing supplied is
/// never flagged as collateral.
pub fn apply_effect(position: &mut Position, effect: &TransactionEffect) {
    match effect.tx_type {
        TransactionType::Supply => {
            position.supplied_amount = position.supplied_amount.saturating_add(effect.amount);
            position.supplied_value_usd =
                position.supplied_value_usd.saturating_add(effect.amount_usd);
            position.is_collateral = true;
        }
        TransactionType::Withdraw => {
            position.supplied_amount = floor_sub(position.supplied_amount, effect.amount);
            position.supplied_value_usd = floor_sub(position.supplied_value_usd, effect.amount_usd);
        }
        TransactionType::Borrow => {
            position.borrowed_amount = position.borrowed_amount.saturating_add(effect.amount);
            position.borrowed_value_usd =
                position.borrowed_value_usd.saturating_add(effect.amount_usd);
        }
        TransactionType::Repay => {
            position.borrowed_amount = floor_sub(position.borrowed_amount, effect.amount);
            position.borrowed_value_usd = floor_sub(position.borrowed_value_usd, effect.amount_usd);
        }
    }

    if position.supplied_amount.is_zero() {
        position.is_collateral = false;
    }
}

/// Apply the effect to the record for `symbol`, leaving every other record
/// untouched. Returns the updated record, or `None` if the account holds no
/// record for the symbol.
pub fn apply_to_account(
    positions: &mut [Position],
    symbol: &str,
    effect: &TransactionEffect,
) -> Option<Position> {
    let position = positions.iter_mut().find(|p| p.symbol == symbol)?;
    apply_effect(position, effect);
    Some(position.clone())
}

/// Copy of `positions` with the effect applied.
pub fn simulate_positions(
    positions: &[Position],
    symbol: &str,
    effect: &TransactionEffect,
) -> (Vec<Position>, Option<Position>) {
    let mut simulated = positions.to_vec();
    let projected = apply_to_account(&mut simulated, symbol, effect);
    (simulated, projected)
}

// ═══════════════════════════════════════════════════════════════════════════
// Preview
// ═══════════════════════════════════════════════════════════════════════════

/// Before/after risk figures for `effect` on `symbol`. Side-effect free.
///
/// Health factors are rounded for display and the no-debt sentinel is
/// replaced by `no_debt_cap`.
pub fn preview(
    registry: &MarketRegistry,
    positions: &[Position],
    symbol: &str,
    effect: &TransactionEffect,
    gas: GasQuote,
    no_debt_cap: Decimal,
) -> TransactionPreview {
    let current = RiskSnapshot::of(positions, registry);
    let (simulated, projected_position) = simulate_positions(positions, symbol, effect);
    let projected = RiskSnapshot::of(&simulated, registry);

    let current_hf = round_display(current.health_factor.or_cap(no_debt_cap));
    let new_hf = round_display(projected.health_factor.or_cap(no_debt_cap));

    TransactionPreview {
        current_health_factor: current_hf,
        new_health_factor: new_hf,
        current_borrowing_power: round_display(current.borrowing_power.power_percent),
        new_borrowing_power: round_display(projected.borrowing_power.power_percent),
        new_health_tier: determine_tier(projected.health_factor),
        will_liquidate: new_hf > Decimal::ZERO && new_hf < HF_LIQUIDATION,
        is_risky: new_hf >= HF_LIQUIDATION && new_hf < HF_DANGER,
        projected_position,
        gas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::HealthTier;

    fn gas() -> GasQuote {
        GasQuote {
            estimated_gas: "0.0025 ETH".into(),
            gas_usd: dec!(5.61),
        }
    }

    fn account(registry: &MarketRegistry, held: &[(&str, Decimal, Decimal)]) -> Vec<Position> {
        let mut positions: Vec<_> = registry.base_markets().iter().map(Position::empty).collect();
        for (symbol, supplied, borrowed) in held {
            let price = registry.price(symbol);
            apply_to_account(
                &mut positions,
                symbol,
                &TransactionEffect::new(TransactionType::Supply, *supplied, price),
            );
            apply_to_account(
                &mut positions,
                symbol,
                &TransactionEffect::new(TransactionType::Borrow, *borrowed, price),
            );
        }
        positions
    }

    fn effect(registry: &MarketRegistry, tx: TransactionType, symbol: &str, amount: Decimal) -> TransactionEffect {
        TransactionEffect::new(tx, amount, registry.price(symbol))
    }

    #[test]
    fn test_borrow_against_eth() {
        let registry = MarketRegistry::reference();
        let positions = account(&registry, &[("ETH", dec!(1.5), dec!(0))]);
        let e = effect(&registry, TransactionType::Borrow, "ETH", dec!(1.0));

        let p = preview(&registry, &positions, "ETH", &e, gas(), dec!(99));

        assert_eq!(p.current_health_factor, dec!(99));
        assert_eq!(p.new_health_factor, dec!(1.20));
        assert_eq!(p.current_borrowing_power, dec!(100));
        // (2694.6 - 2245.5) / 2694.6
        assert_eq!(p.new_borrowing_power, dec!(16.67));
        assert_eq!(p.new_health_tier, HealthTier::AtRisk);
        assert!(!p.will_liquidate);
        assert!(!p.is_risky);
        assert_eq!(p.gas, gas());

        let projected = p.projected_position.unwrap();
        assert_eq!(projected.borrowed_amount, dec!(1.0));
        assert_eq!(projected.borrowed_value_usd, dec!(2245.50));
    }

    #[test]
    fn test_preview_flags_risk_and_liquidation() {
        let registry = MarketRegistry::reference();
        // 1000 USDC collateral at cf 0.85 = 850 weighted.
        let positions = account(&registry, &[("USDC", dec!(1000), dec!(0))]);

        let risky = preview(
            &registry,
            &positions,
            "DAI",
            &effect(&registry, TransactionType::Borrow, "DAI", dec!(800)),
            gas(),
            dec!(99),
        );
        assert_eq!(risky.new_health_factor, dec!(1.06));
        assert!(risky.is_risky);
        assert!(!risky.will_liquidate);
        assert_eq!(risky.new_health_tier, HealthTier::Danger);

        let underwater = preview(
            &registry,
            &positions,
            "DAI",
            &effect(&registry, TransactionType::Borrow, "DAI", dec!(1000)),
            gas(),
            dec!(99),
        );
        assert_eq!(underwater.new_health_factor, dec!(0.85));
        assert!(underwater.will_liquidate);
        assert!(!underwater.is_risky);
        assert_eq!(underwater.new_health_tier, HealthTier::Liquidatable);
        assert_eq!(underwater.new_borrowing_power, Decimal::ZERO);
    }

    #[test]
    fn test_over_withdraw_clamps_and_clears_collateral() {
        let registry = MarketRegistry::reference();
        let mut positions = account(&registry, &[("ETH", dec!(1.0), dec!(0))]);
        let e = effect(&registry, TransactionType::Withdraw, "ETH", dec!(5.0));

        let updated = apply_to_account(&mut positions, "ETH", &e).unwrap();
        assert_eq!(updated.supplied_amount, Decimal::ZERO);
        assert_eq!(updated.supplied_value_usd, Decimal::ZERO);
        assert!(!updated.is_collateral);
    }

    #[test]
    fn test_over_repay_clamps() {
        let registry = MarketRegistry::reference();
        let mut positions = account(&registry, &[("USDC", dec!(100), dec!(40))]);
        let e = effect(&registry, TransactionType::Repay, "USDC", dec!(50));

        let updated = apply_to_account(&mut positions, "USDC", &e).unwrap();
        assert_eq!(updated.borrowed_amount, Decimal::ZERO);
        assert_eq!(updated.borrowed_value_usd, Decimal::ZERO);
        assert!(updated.is_collateral);
    }

    #[test]
    fn test_zero_supply_on_empty_record_is_not_collateral() {
        let registry = MarketRegistry::reference();
        let mut positions = account(&registry, &[]);
        let e = effect(&registry, TransactionType::Supply, "DAI", Decimal::ZERO);

        let updated = apply_to_account(&mut positions, "DAI", &e).unwrap();
        assert!(updated.is_empty());
        assert!(!updated.is_collateral);
    }

    #[test]
    fn test_unknown_asset_preview_completes() {
        let registry = MarketRegistry::reference();
        let positions = account(&registry, &[("USDC", dec!(5000), dec!(1500))]);
        let e = effect(&registry, TransactionType::Supply, "ZZZ", dec!(10));
        assert_eq!(e.amount_usd, dec!(10));

        let p = preview(&registry, &positions, "ZZZ", &e, gas(), dec!(99));
        assert!(p.projected_position.is_none());
        assert_eq!(p.current_health_factor, p.new_health_factor);
        assert_eq!(p.current_borrowing_power, p.new_borrowing_power);
    }

    #[test]
    fn test_preview_does_not_touch_input() {
        let registry = MarketRegistry::reference();
        let positions = account(&registry, &[("ETH", dec!(1.5), dec!(0))]);
        let before = positions.clone();
        let e = effect(&registry, TransactionType::Withdraw, "ETH", dec!(1.5));

        let _ = preview(&registry, &positions, "ETH", &e, gas(), dec!(99));
        assert_eq!(positions, before);
    }

    #[test]
    fn test_preview_projection_matches_applied_state() {
        let registry = MarketRegistry::reference();
        let mut positions = account(&registry, &[("WBTC", dec!(0.05), dec!(0))]);
        let e = effect(&registry, TransactionType::Supply, "WBTC", dec!(0.125));

        let projected = preview(&registry, &positions, "WBTC", &e, gas(), dec!(99))
            .projected_position
            .unwrap();
        let applied = apply_to_account(&mut positions, "WBTC", &e).unwrap();
        assert_eq!(projected, applied);
        assert_eq!(applied.supplied_amount, dec!(0.175));
    }

    #[test]
    fn test_overflowing_effect_is_noop() {
        let e = TransactionEffect::new(TransactionType::Supply, Decimal::MAX, dec!(43250));
        assert_eq!(e.amount, Decimal::ZERO);
        assert_eq!(e.amount_usd, Decimal::ZERO);
    }

    #[test]
    fn test_custom_no_debt_cap() {
        let registry = MarketRegistry::reference();
        let positions = account(&registry, &[]);
        let e = effect(&registry, TransactionType::Supply, "ETH", dec!(1));
        let p = preview(&registry, &positions, "ETH", &e, gas(), dec!(1000));
        assert_eq!(p.current_health_factor, dec!(1000));
        assert_eq!(p.new_health_factor, dec!(1000));
        assert_eq!(p.new_health_tier, HealthTier::Safe);
    }
}
