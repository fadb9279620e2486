use std::collections::HashSet;

use anyhow::{bail, Result};
use rust_decimal::Decimal;

use super::types::EngineConfig;

/// Validate invariants across the merged config that serde alone cannot enforce.
///
/// Every violation is collected so a single run reports all of them. Called
/// automatically by [`super::load_config`].
pub fn validate_config(config: &EngineConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_markets_config(config, &mut errors);
    validate_engine_config(config, &mut errors);
    validate_demo_account(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// Markets config
// ---------------------------------------------------------------------------

fn validate_markets_config(config: &EngineConfig, errors: &mut Vec<String>) {
    let markets = &config.markets;

    if markets.networks.is_empty() {
        errors.push("markets.networks: must have at least one network".into());
    }
    let mut network_ids = HashSet::new();
    for network in &markets.networks {
        if !network_ids.insert(network.id) {
            errors.push(format!("markets.networks: duplicate network id {}", network.id));
        }
    }

    let mut asset_symbols = HashSet::new();
    for asset in &markets.assets {
        if asset.symbol.trim().is_empty() {
            errors.push("markets.assets: symbol is empty".into());
        }
        if !asset_symbols.insert(asset.symbol.as_str()) {
            errors.push(format!("markets.assets: duplicate symbol {}", asset.symbol));
        }
    }

    if markets.markets.is_empty() {
        errors.push("markets.markets: must have at least one market".into());
    }

    let mut market_symbols = HashSet::new();
    for market in &markets.markets {
        let name = &market.symbol;

        if !market_symbols.insert(name.as_str()) {
            errors.push(format!("markets.markets: duplicate symbol {name}"));
        }
        if !asset_symbols.contains(name.as_str()) {
            errors.push(format!("markets.markets.{name}: no matching asset entry"));
        }
        if !in_unit_range(market.collateral_factor) {
            errors.push(format!(
                "markets.markets.{name}: collateral_factor ({}) must be in [0, 1]",
                market.collateral_factor
            ));
        }
        if !in_unit_range(market.liquidation_threshold) {
            errors.push(format!(
                "markets.markets.{name}: liquidation_threshold ({}) must be in [0, 1]",
                market.liquidation_threshold
            ));
        }
        if market.collateral_factor > market.liquidation_threshold {
            errors.push(format!(
                "markets.markets.{name}: collateral_factor ({}) must be <= liquidation_threshold ({})",
                market.collateral_factor, market.liquidation_threshold
            ));
        }
        if market.price_usd <= Decimal::ZERO {
            errors.push(format!(
                "markets.markets.{name}: price_usd ({}) must be > 0",
                market.price_usd
            ));
        }
        if market.supply_apy < Decimal::ZERO || market.borrow_apy < Decimal::ZERO {
            errors.push(format!("markets.markets.{name}: APYs must be >= 0"));
        }
    }
}

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

fn validate_engine_config(config: &EngineConfig, errors: &mut Vec<String>) {
    let engine = &config.engine;

    if engine.no_debt_health_factor <= Decimal::ZERO {
        errors.push(format!(
            "engine: no_debt_health_factor ({}) must be > 0",
            engine.no_debt_health_factor
        ));
    }
    if engine.gas.gas_usd < Decimal::ZERO {
        errors.push(format!("engine.gas: gas_usd ({}) must be >= 0", engine.gas.gas_usd));
    }
}

fn validate_demo_account(config: &EngineConfig, errors: &mut Vec<String>) {
    let Some(demo) = config.engine.demo_account.as_ref().filter(|d| d.enabled) else {
        return;
    };

    if demo.address.trim().is_empty() {
        errors.push("engine.demo_account: address is empty".into());
    }

    for pos in &demo.positions {
        let symbol = &pos.symbol;
        if !config.markets.markets.iter().any(|m| &m.symbol == symbol) {
            errors.push(format!("engine.demo_account.{symbol}: unknown market"));
        }
        if pos.supplied_amount < Decimal::ZERO || pos.borrowed_amount < Decimal::ZERO {
            errors.push(format!("engine.demo_account.{symbol}: amounts must be >= 0"));
        }
        if pos.is_collateral && pos.supplied_amount.is_zero() {
            errors.push(format!(
                "engine.demo_account.{symbol}: is_collateral requires a non-zero supplied_amount"
            ));
        }
    }
}

fn in_unit_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
